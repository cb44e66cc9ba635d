//! The single error type for the whole crate.
//!
//! Every failure of the codec is a return value. Nothing here is fatal to the
//! process; the caller decides whether to keep the raw bytes, retry with another
//! configuration, or give up on the block.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TextCodecError {
    // =========================================================================
    // === Forward transform
    // =========================================================================
    /// The encoded block would not be strictly smaller than the input.
    #[error("transform does not shrink the block ({input} bytes)")]
    NotCompressible { input: usize },

    /// The destination buffer cannot hold the result.
    #[error("destination buffer too small (capacity {capacity} bytes)")]
    OutputOverflow { capacity: usize },

    // =========================================================================
    // === Inverse transform (corrupt or mismatched streams)
    // =========================================================================
    #[error("truncated escape sequence at offset {offset}")]
    TruncatedEscape { offset: usize },

    #[error("malformed escape sequence at offset {offset}")]
    MalformedEscape { offset: usize },

    #[error("dictionary index {index} at offset {offset} is out of range ({size} words known)")]
    InvalidIndex {
        index: usize,
        size: usize,
        offset: usize,
    },

    #[error("word reference at offset {offset} is not on a word boundary")]
    MisplacedReference { offset: usize },

    // =========================================================================
    // === Construction and artifacts
    // =========================================================================
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid word list: {0}")]
    InvalidWordList(String),

    #[error("block container error: {0}")]
    Container(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CBOR error: {0}")]
    Cbor(#[from] serde_cbor::Error),
}

impl TextCodecError {
    /// True when the caller can simply keep the untransformed bytes.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TextCodecError::NotCompressible { .. } | TextCodecError::OutputOverflow { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, TextCodecError>;
