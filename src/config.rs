//! Codec configuration.
//!
//! A [`TextCodecConfig`] is fixed for the lifetime of a codec instance. Encoder and
//! decoder must agree on every field: the escape bytes shape the wire format, and
//! the hash-table size and dictionary capacity decide how the dynamic dictionary
//! grows.

use serde::{Deserialize, Serialize};

use crate::char_class::is_word_byte;
use crate::error::{Result, TextCodecError};

/// Largest dictionary that fits the 15-bit reference index.
pub const LOG_DICT_SIZE: u32 = 15;
pub const DICTIONARY_SIZE: usize = 1 << LOG_DICT_SIZE;
/// Default hash index: 16M slots.
pub const LOG_HASHES_SIZE: u32 = 24;
pub const MIN_LOG_HASHES_SIZE: u32 = 8;
pub const DEFAULT_ESCAPE_TOKEN1: u8 = b'@';
pub const DEFAULT_ESCAPE_TOKEN2: u8 = b'^';

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct TextCodecConfig {
    /// log2 of the number of hash index slots.
    pub log_hash_size: u32,
    /// Maximum number of dictionary entries, static ones included.
    pub dict_size: usize,
    /// Escape for references to a word as stored (and for its own literal form).
    pub escape1: u8,
    /// Escape for references to a word whose first letter has its case flipped.
    pub escape2: u8,
    /// Let `Word` reuse the entry of `word` (and the other way round).
    pub case_folding: bool,
}

impl Default for TextCodecConfig {
    fn default() -> Self {
        Self {
            log_hash_size: LOG_HASHES_SIZE,
            dict_size: DICTIONARY_SIZE,
            escape1: DEFAULT_ESCAPE_TOKEN1,
            escape2: DEFAULT_ESCAPE_TOKEN2,
            case_folding: true,
        }
    }
}

impl TextCodecConfig {
    pub fn with_log_hash_size(mut self, log_hash_size: u32) -> Self {
        self.log_hash_size = log_hash_size;
        self
    }

    pub fn with_dict_size(mut self, dict_size: usize) -> Self {
        self.dict_size = dict_size;
        self
    }

    pub fn with_escapes(mut self, escape1: u8, escape2: u8) -> Self {
        self.escape1 = escape1;
        self.escape2 = escape2;
        self
    }

    pub fn with_case_folding(mut self, case_folding: bool) -> Self {
        self.case_folding = case_folding;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_LOG_HASHES_SIZE..=LOG_HASHES_SIZE).contains(&self.log_hash_size) {
            return Err(TextCodecError::InvalidConfig(format!(
                "log_hash_size must be in {}..={}, got {}",
                MIN_LOG_HASHES_SIZE, LOG_HASHES_SIZE, self.log_hash_size
            )));
        }
        if self.dict_size == 0 || self.dict_size > DICTIONARY_SIZE {
            return Err(TextCodecError::InvalidConfig(format!(
                "dict_size must be in 1..={}, got {}",
                DICTIONARY_SIZE, self.dict_size
            )));
        }
        if self.escape1 == self.escape2 {
            return Err(TextCodecError::InvalidConfig(format!(
                "escape bytes must differ (both are {:#04x})",
                self.escape1
            )));
        }
        for escape in [self.escape1, self.escape2] {
            if !is_word_byte(escape) {
                return Err(TextCodecError::InvalidConfig(format!(
                    "escape byte {:#04x} must be a word byte",
                    escape
                )));
            }
        }
        Ok(())
    }
}
