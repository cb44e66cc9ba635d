use crate::char_class::flip_case;

pub const HASH1: u32 = 200_002_979;
pub const HASH2: u32 = 50_004_239;

/// Shortest word the codec will look up, insert or seed.
pub const MIN_WORD_LENGTH: usize = 2;
/// Longest word the codec will look up, insert or seed.
pub const MAX_WORD_LENGTH: usize = 64;

/// Hashes a word byte by byte with wrapping `u32` arithmetic.
///
/// Encoder, decoder and the dictionary builder must all agree on this function;
/// any change breaks every previously encoded stream.
///
/// ```
/// use textcodec::dictionary_lib::word_hash;
/// assert_eq!(word_hash(b"cat"), word_hash(b"cat"));
/// assert_ne!(word_hash(b"cat"), word_hash(b"Cat"));
/// ```
#[inline]
pub fn word_hash(word: &[u8]) -> u32 {
    word.iter().fold(HASH1, |h, &b| {
        h.wrapping_mul(HASH1) ^ (b as u32).wrapping_mul(HASH2)
    })
}

/// Hash of `word` as if its first byte had the opposite ASCII case.
#[inline]
pub fn word_hash_flipped(word: &[u8]) -> u32 {
    match word.split_first() {
        None => HASH1,
        Some((&first, rest)) => {
            let h = HASH1.wrapping_mul(HASH1) ^ (flip_case(first) as u32).wrapping_mul(HASH2);
            rest.iter().fold(h, |h, &b| {
                h.wrapping_mul(HASH1) ^ (b as u32).wrapping_mul(HASH2)
            })
        }
    }
}

/// True when `len` is inside `[MIN_WORD_LENGTH, MAX_WORD_LENGTH]`.
#[inline]
pub fn is_indexable_length(len: usize) -> bool {
    (MIN_WORD_LENGTH..=MAX_WORD_LENGTH).contains(&len)
}

/// Which buffer the bytes of a [`DictEntry`] live in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WordSource {
    /// The codec's shared static word list.
    Static,
    /// The buffer of the current call: the source while encoding, the output while
    /// decoding.
    Block,
}

/// One dictionary slot: a view `pos..pos + length` into the buffer named by `source`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DictEntry {
    pub hash: u32,
    pub pos: usize,
    pub index: u16,
    pub length: u16,
    pub source: WordSource,
}

impl DictEntry {
    #[inline]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.pos..self.pos + self.length as usize
    }
}
