//! Reversible word substitution for text blocks.
//!
//! [`TextCodec`] replaces words it has seen before (in a static word list or
//! earlier in the same block) by short escape tokens that point into a dictionary.
//! The decoder rebuilds that dictionary from its own output, so nothing but the
//! transformed bytes has to be stored. The transform is meant to run ahead of an
//! entropy coder; on its own it only removes whole-word repetitions.
//!
//! ```
//! use textcodec::TextCodec;
//!
//! let text = b"the cat and the dog and the bird";
//! let mut codec = TextCodec::new();
//! let encoded = codec.forward_to_vec(text).unwrap();
//! assert!(encoded.len() < text.len());
//! assert_eq!(codec.inverse_to_vec(&encoded).unwrap(), text);
//! ```
//!
//! Larger inputs go through [`block::BlockCodec`], which splits them on word
//! boundaries and can run blocks in parallel.

use std::sync::Arc;

use log::debug;

pub mod block;
pub mod char_class;
pub mod config;
pub mod decoder;
pub mod dictionary_lib;
pub mod encoder;
pub mod error;
pub mod escape;
pub mod function;
pub mod transform_sequence;
pub mod utils;

pub use crate::config::TextCodecConfig;
pub use crate::dictionary_lib::{WordList, DEFAULT_WORD_LIST};
pub use crate::error::{Result, TextCodecError};
pub use crate::function::ByteFunction;

use crate::decoder::InverseTransform;
use crate::dictionary_lib::{create_dictionary, DictionaryStore};
use crate::encoder::{ForwardTransform, TransformStats};
use crate::escape::EscapeCodec;

/// One word substitution codec instance.
///
/// An instance holds a dictionary that is reset at the start of every call, so
/// each block is encoded independently. Use one instance per thread.
#[derive(Debug, Clone)]
pub struct TextCodec {
    config: TextCodecConfig,
    escapes: EscapeCodec,
    store: DictionaryStore,
    scratch: Vec<u8>,
}

impl TextCodec {
    /// Default configuration and the built-in English word list.
    pub fn new() -> Self {
        let config = TextCodecConfig::default();
        Self::build(Arc::clone(&DEFAULT_WORD_LIST), config)
    }

    /// Built-in English word list with a custom configuration.
    pub fn with_config(config: TextCodecConfig) -> Result<Self> {
        Self::with_word_list(Arc::clone(&DEFAULT_WORD_LIST), config)
    }

    /// Seeds the dictionary from a packed word list blob instead of the built-in one.
    pub fn with_dictionary(blob: &[u8], config: TextCodecConfig) -> Result<Self> {
        Self::with_word_list(Arc::new(WordList::from_packed(blob.to_vec())), config)
    }

    pub fn with_word_list(words: Arc<WordList>, config: TextCodecConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(words, config))
    }

    /// Builds a codec from an already validated configuration.
    pub(crate) fn build(words: Arc<WordList>, config: TextCodecConfig) -> Self {
        let mut store = DictionaryStore::new(config.log_hash_size, config.dict_size);
        create_dictionary(&words, &mut store, config.dict_size);
        Self {
            config,
            escapes: EscapeCodec::new(config.escape1, config.escape2),
            store,
            scratch: Vec::new(),
        }
    }

    /// Encodes `src` into `dst` and returns the encoded length.
    ///
    /// Fails with [`TextCodecError::NotCompressible`] when the result would not be
    /// strictly smaller than `src`, and with [`TextCodecError::OutputOverflow`]
    /// when `dst` is too small. In both cases the caller keeps `src` as is.
    pub fn forward(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize> {
        let mut scratch = std::mem::take(&mut self.scratch);
        let result = self.forward_into(src, &mut scratch, dst.len());
        if result.is_ok() {
            dst[..scratch.len()].copy_from_slice(&scratch);
        }
        let len = scratch.len();
        self.scratch = scratch;
        result.map(|_| len)
    }

    /// Decodes `src` into `dst` and returns the decoded length.
    pub fn inverse(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize> {
        let mut scratch = std::mem::take(&mut self.scratch);
        let result = self.inverse_into(src, &mut scratch, dst.len());
        if result.is_ok() {
            dst[..scratch.len()].copy_from_slice(&scratch);
        }
        let len = scratch.len();
        self.scratch = scratch;
        result.map(|_| len)
    }

    pub fn forward_to_vec(&mut self, src: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(src.len());
        self.forward_into(src, &mut out, src.len())?;
        Ok(out)
    }

    pub fn inverse_to_vec(&mut self, src: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(src.len() * 2);
        self.inverse_into(src, &mut out, usize::MAX)?;
        Ok(out)
    }

    fn forward_into(&mut self, src: &[u8], out: &mut Vec<u8>, limit: usize) -> Result<TransformStats> {
        self.store.reset();
        let stats = ForwardTransform::new(&mut self.store, self.escapes, self.config.case_folding)
            .run(src, out, limit)?;
        debug!(
            "forward: {} -> {} bytes, {} references, {} new words",
            src.len(),
            out.len(),
            stats.references,
            stats.inserted
        );
        Ok(stats)
    }

    fn inverse_into(&mut self, src: &[u8], out: &mut Vec<u8>, limit: usize) -> Result<TransformStats> {
        self.store.reset();
        let stats = InverseTransform::new(&mut self.store, self.escapes, self.config.case_folding)
            .run(src, out, limit)?;
        debug!(
            "inverse: {} -> {} bytes, {} references, {} new words",
            src.len(),
            out.len(),
            stats.references,
            stats.inserted
        );
        Ok(stats)
    }

    /// The encoded size never exceeds the input size.
    pub fn max_encoded_len(&self, src_len: usize) -> usize {
        src_len
    }

    /// Entries currently in the dictionary (static plus those of the last call).
    pub fn dictionary_len(&self) -> usize {
        self.store.len()
    }

    pub fn static_dictionary_len(&self) -> usize {
        self.store.static_size()
    }

    pub fn config(&self) -> &TextCodecConfig {
        &self.config
    }

    pub fn word_list(&self) -> &Arc<WordList> {
        self.store.static_words()
    }
}

impl Default for TextCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteFunction for TextCodec {
    fn forward(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize> {
        TextCodec::forward(self, src, dst)
    }

    fn inverse(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize> {
        TextCodec::inverse(self, src, dst)
    }

    fn max_encoded_len(&self, src_len: usize) -> usize {
        TextCodec::max_encoded_len(self, src_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_codec_is_seeded_with_default_list() {
        let codec = TextCodec::new();
        assert_eq!(codec.static_dictionary_len(), 1024);
        assert_eq!(codec.dictionary_len(), 1024);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = TextCodecConfig::default().with_escapes(b'#', b'#');
        assert!(matches!(TextCodec::with_config(cfg), Err(TextCodecError::InvalidConfig(_))));
    }

    #[test]
    fn forward_resets_dictionary_between_calls() {
        let mut codec = TextCodec::with_config(TextCodecConfig::default().with_log_hash_size(16)).unwrap();
        let src = b"zebra quokka zebra quokka";
        let first = codec.forward_to_vec(src).unwrap();
        assert_eq!(codec.dictionary_len(), 1026);
        let second = codec.forward_to_vec(src).unwrap();
        assert_eq!(first, second);
        assert_eq!(codec.dictionary_len(), 1026);
    }

    #[test]
    fn empty_input() {
        let mut codec = TextCodec::new();
        let mut dst = [0u8; 4];
        assert_eq!(codec.forward(b"", &mut dst).unwrap(), 0);
        assert_eq!(codec.inverse(b"", &mut dst).unwrap(), 0);
    }
}
