//! Escape tokens: how dictionary references and literal escape bytes are written.
//!
//! | Bytes                              | Meaning                                   |
//! |------------------------------------|-------------------------------------------|
//! | `E, i` (`i < 0x80`)                | reference to index `i`                    |
//! | `E, 0x80 \| (i >> 8), i & 0xFF`    | reference to index `i` (`128..=32767`)    |
//! | `E, 0x80, 0x00`                    | the byte `E` itself                       |
//!
//! `E` is either escape byte. The first one refers to a word as stored, the second
//! one to the word with the case of its first letter flipped.

use crate::error::{Result, TextCodecError};

/// Largest index a reference can carry.
pub const MAX_INDEX: u16 = 0x7FFF;
const LONG_FLAG: u8 = 0x80;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Reference { index: u16, flipped: bool },
    Literal(u8),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EscapeCodec {
    escape1: u8,
    escape2: u8,
}

impl EscapeCodec {
    pub fn new(escape1: u8, escape2: u8) -> Self {
        Self { escape1, escape2 }
    }

    #[inline]
    pub fn is_escape(&self, b: u8) -> bool {
        b == self.escape1 || b == self.escape2
    }

    /// Bytes a reference to `index` takes on the wire.
    #[inline]
    pub fn reference_len(index: u16) -> usize {
        if index < 0x80 {
            2
        } else {
            3
        }
    }

    /// Appends a reference token. `index` must not exceed [`MAX_INDEX`].
    pub fn write_reference(&self, index: u16, flipped: bool, out: &mut Vec<u8>) {
        let escape = if flipped { self.escape2 } else { self.escape1 };
        if index < 0x80 {
            out.extend_from_slice(&[escape, index as u8]);
        } else {
            out.extend_from_slice(&[escape, LONG_FLAG | (index >> 8) as u8, index as u8]);
        }
    }

    /// Appends the three-byte form of a literal escape byte.
    pub fn write_literal(&self, escape: u8, out: &mut Vec<u8>) {
        out.extend_from_slice(&[escape, LONG_FLAG, 0x00]);
    }

    /// Decodes the token starting at `src[pos]`, which must be an escape byte.
    /// Returns the token and the number of bytes it spans.
    pub fn decode(&self, src: &[u8], pos: usize) -> Result<(Token, usize)> {
        let escape = src[pos];
        let flipped = escape == self.escape2;
        let b1 = *src
            .get(pos + 1)
            .ok_or(TextCodecError::TruncatedEscape { offset: pos })?;

        if b1 & LONG_FLAG == 0 {
            return Ok((
                Token::Reference {
                    index: b1 as u16,
                    flipped,
                },
                2,
            ));
        }

        let b2 = *src
            .get(pos + 2)
            .ok_or(TextCodecError::TruncatedEscape { offset: pos })?;
        let value = (((b1 & !LONG_FLAG) as u16) << 8) | b2 as u16;
        match value {
            0 => Ok((Token::Literal(escape), 3)),
            1..=0x7F => Err(TextCodecError::MalformedEscape { offset: pos }),
            index => Ok((Token::Reference { index, flipped }, 3)),
        }
    }
}
