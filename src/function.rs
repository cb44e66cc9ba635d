/// A reversible transform over byte slices.
///
/// Both directions write into a caller-provided destination and return the number
/// of bytes written. A forward call that fails leaves the caller free to keep the
/// source bytes unchanged.
pub trait ByteFunction {
    fn forward(&mut self, src: &[u8], dst: &mut [u8]) -> crate::Result<usize>;

    fn inverse(&mut self, src: &[u8], dst: &mut [u8]) -> crate::Result<usize>;

    /// Destination size that is always large enough for `forward` on `src_len` bytes.
    fn max_encoded_len(&self, src_len: usize) -> usize;
}
