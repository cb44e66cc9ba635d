//! Chains up to four byte functions and records which of them were skipped.

use crate::error::{Result, TextCodecError};
use crate::function::ByteFunction;

/// All four skip bits set: nothing was transformed.
pub const TRANSFORM_SKIP_MASK: u8 = 0x0F;
pub const MAX_TRANSFORMS: usize = 4;

/// Runs transforms one after the other, feeding each output into the next.
///
/// A transform that fails during `forward` is skipped: its input is passed on
/// unchanged and bit `3 - i` of the skip flags is set. The flags must travel with
/// the encoded data so that `inverse` knows which transforms to undo.
pub struct ByteTransformSequence {
    transforms: Vec<Box<dyn ByteFunction + Send>>,
    skip_flags: u8,
}

impl ByteTransformSequence {
    pub fn new(transforms: Vec<Box<dyn ByteFunction + Send>>) -> Result<Self> {
        if transforms.is_empty() || transforms.len() > MAX_TRANSFORMS {
            return Err(TextCodecError::InvalidConfig(format!(
                "a transform sequence holds 1 to {} transforms, got {}",
                MAX_TRANSFORMS,
                transforms.len()
            )));
        }
        Ok(Self {
            transforms,
            skip_flags: 0,
        })
    }

    /// A sequence of exactly one transform.
    pub fn single(transform: Box<dyn ByteFunction + Send>) -> Self {
        Self {
            transforms: vec![transform],
            skip_flags: 0,
        }
    }

    /// Applies every transform in order and writes the result to `dst`.
    ///
    /// When every transform was skipped, `src` is still copied to `dst` but the
    /// first transform error is returned, so the caller can store the block raw.
    pub fn forward(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize> {
        self.skip_flags = TRANSFORM_SKIP_MASK;
        if src.is_empty() {
            return Ok(0);
        }

        self.skip_flags = 0;
        let mut current = src.to_vec();
        let mut scratch = Vec::new();
        let mut first_error = None;

        for (i, t) in self.transforms.iter_mut().enumerate() {
            scratch.clear();
            scratch.resize(t.max_encoded_len(current.len()), 0);
            match t.forward(&current, &mut scratch) {
                Ok(n) => {
                    scratch.truncate(n);
                    std::mem::swap(&mut current, &mut scratch);
                }
                Err(err) => {
                    self.skip_flags |= 1 << (3 - i);
                    first_error.get_or_insert(err);
                }
            }
        }
        for i in self.transforms.len()..MAX_TRANSFORMS {
            self.skip_flags |= 1 << (3 - i);
        }

        if dst.len() < current.len() {
            return Err(TextCodecError::OutputOverflow { capacity: dst.len() });
        }
        dst[..current.len()].copy_from_slice(&current);

        match first_error {
            Some(err) if self.skip_flags == TRANSFORM_SKIP_MASK => Err(err),
            _ => Ok(current.len()),
        }
    }

    /// Undoes the transforms that were not skipped, last one first.
    ///
    /// `original_len` is the length of the data before `forward`; it sizes the
    /// intermediate buffers.
    pub fn inverse(&mut self, src: &[u8], dst: &mut [u8], original_len: usize) -> Result<usize> {
        let mut current = src.to_vec();
        let mut scratch = Vec::new();
        let stage_len = self.max_encoded_len(original_len);

        for i in (0..self.transforms.len()).rev() {
            if self.skip_flags & (1 << (3 - i)) != 0 {
                continue;
            }
            scratch.clear();
            scratch.resize(stage_len, 0);
            let n = self.transforms[i].inverse(&current, &mut scratch)?;
            scratch.truncate(n);
            std::mem::swap(&mut current, &mut scratch);
        }

        if dst.len() < current.len() {
            return Err(TextCodecError::OutputOverflow { capacity: dst.len() });
        }
        dst[..current.len()].copy_from_slice(&current);
        Ok(current.len())
    }

    pub fn max_encoded_len(&self, src_len: usize) -> usize {
        self.transforms
            .iter()
            .map(|t| t.max_encoded_len(src_len))
            .fold(src_len, usize::max)
    }

    pub fn skip_flags(&self) -> u8 {
        self.skip_flags
    }

    /// Restores the flags recorded with an encoded block before calling `inverse`.
    pub fn set_skip_flags(&mut self, flags: u8) -> Result<()> {
        if flags & !TRANSFORM_SKIP_MASK != 0 {
            return Err(TextCodecError::Container(format!(
                "invalid skip flags {:#04x}",
                flags
            )));
        }
        self.skip_flags = flags;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TextCodec;

    /// Adds one to every byte.
    struct Shift;

    impl ByteFunction for Shift {
        fn forward(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize> {
            for (d, s) in dst.iter_mut().zip(src) {
                *d = s.wrapping_add(1);
            }
            Ok(src.len())
        }

        fn inverse(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize> {
            for (d, s) in dst.iter_mut().zip(src) {
                *d = s.wrapping_sub(1);
            }
            Ok(src.len())
        }

        fn max_encoded_len(&self, src_len: usize) -> usize {
            src_len
        }
    }

    #[test]
    fn rejects_empty_and_oversized_sequences() {
        assert!(ByteTransformSequence::new(vec![]).is_err());
        let five: Vec<Box<dyn ByteFunction + Send>> = (0..5)
            .map(|_| Box::new(Shift) as Box<dyn ByteFunction + Send>)
            .collect();
        assert!(ByteTransformSequence::new(five).is_err());
    }

    #[test]
    fn failing_stage_is_skipped() {
        // The text codec refuses binary data; the shift still applies.
        let stages: Vec<Box<dyn ByteFunction + Send>> = vec![Box::new(TextCodec::new()), Box::new(Shift)];
        let mut seq = ByteTransformSequence::new(stages).unwrap();
        let src = [0u8, 1, 2, 3, 4, 5];
        let mut dst = [0u8; 6];
        assert_eq!(seq.forward(&src, &mut dst).unwrap(), 6);
        assert_eq!(dst, [1, 2, 3, 4, 5, 6]);
        assert_eq!(seq.skip_flags(), 0b1000 | 0b0011);

        let mut back = [0u8; 6];
        assert_eq!(seq.inverse(&dst, &mut back, 6).unwrap(), 6);
        assert_eq!(back, src);
    }

    #[test]
    fn all_skipped_copies_and_reports() {
        let mut seq = ByteTransformSequence::new(vec![Box::new(TextCodec::new())]).unwrap();
        let src = [0u8, 0, 0, 7];
        let mut dst = [0u8; 4];
        assert!(seq.forward(&src, &mut dst).unwrap_err().is_recoverable());
        assert_eq!(dst, src);
        assert_eq!(seq.skip_flags(), TRANSFORM_SKIP_MASK);
    }

    #[test]
    fn text_codec_stage_roundtrip() {
        let mut seq = ByteTransformSequence::new(vec![Box::new(TextCodec::new())]).unwrap();
        let src = b"the house and the garden and the house";
        let mut dst = vec![0u8; seq.max_encoded_len(src.len())];
        let n = seq.forward(src, &mut dst).unwrap();
        assert!(n < src.len());
        assert_eq!(seq.skip_flags(), 0b0111);

        let flags = seq.skip_flags();
        let mut other = ByteTransformSequence::new(vec![Box::new(TextCodec::new())]).unwrap();
        other.set_skip_flags(flags).unwrap();
        let mut back = vec![0u8; src.len()];
        assert_eq!(other.inverse(&dst[..n], &mut back, src.len()).unwrap(), src.len());
        assert_eq!(&back, src);
        assert!(other.set_skip_flags(0x10).is_err());
    }
}
