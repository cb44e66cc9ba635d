//! Packed static word lists.
//!
//! A packed list is a plain byte buffer of words, each one terminated by a
//! delimiter byte (usually `\n` or a space). The compiled-in English list is a
//! valid packed list, and so is any newline-separated text file of words.
//!
//! Lists can also be stored as CBOR, optionally inside a Zstd frame, the same way
//! the other dictionary artifacts of this workspace are shipped.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Cursor};
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use zstd::{decode_all, Decoder, Encoder};

use crate::char_class::{is_delimiter, is_word_byte};
use crate::dictionary_lib::dict_entry::{is_indexable_length, word_hash, MAX_WORD_LENGTH, MIN_WORD_LENGTH};
use crate::error::{Result, TextCodecError};

/// The English list compiled into the crate: 1024 common lowercase words.
pub static DEFAULT_WORD_LIST: Lazy<Arc<WordList>> = Lazy::new(|| {
    Arc::new(WordList::from_packed(
        include_bytes!("dicts/en_1024.txt").to_vec(),
    ))
});

/// Zstd level used for `.zstd` artifacts.
const ZSTD_LEVEL: i32 = 19;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct WordList {
    packed: Vec<u8>,
}

impl WordList {
    /// Wraps an already packed buffer. Nothing is validated here: malformed tails
    /// are simply ignored by [`WordList::words`].
    pub fn from_packed(packed: Vec<u8>) -> Self {
        Self { packed }
    }

    /// Packs `words` with `\n` terminators.
    ///
    /// Every word must consist of word bytes only and have an indexable length.
    pub fn from_words<I, W>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = W>,
        W: AsRef<[u8]>,
    {
        let mut packed = Vec::new();
        for word in words {
            let word = word.as_ref();
            if !is_indexable_length(word.len()) {
                return Err(TextCodecError::InvalidWordList(format!(
                    "word {:?} must be {}..={} bytes long",
                    String::from_utf8_lossy(word),
                    MIN_WORD_LENGTH,
                    MAX_WORD_LENGTH
                )));
            }
            if let Some(&b) = word.iter().find(|&&b| !is_word_byte(b)) {
                return Err(TextCodecError::InvalidWordList(format!(
                    "word {:?} contains delimiter byte {:#04x}",
                    String::from_utf8_lossy(word),
                    b
                )));
            }
            packed.extend_from_slice(word);
            packed.push(b'\n');
        }
        Ok(Self { packed })
    }

    /// Reads a packed list from a text file (one word per line, or any delimiters).
    pub fn from_text_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_packed(fs::read(path)?))
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self> {
        Ok(serde_cbor::from_slice(bytes)?)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        Ok(serde_cbor::to_vec(self)?)
    }

    pub fn serialize_to_cbor<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_cbor()?)?;
        Ok(())
    }

    pub fn deserialize_from_cbor<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_cbor(&fs::read(path)?)
    }

    /// Decodes a Zstd frame holding a CBOR-encoded list.
    pub fn from_zstd_bytes(bytes: &[u8]) -> Result<Self> {
        let cbor = decode_all(Cursor::new(bytes))?;
        Self::from_cbor(&cbor)
    }

    pub fn save_compressed<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        let mut encoder = Encoder::new(writer, ZSTD_LEVEL)?;
        serde_cbor::to_writer(&mut encoder, self)?;
        encoder.finish()?;
        Ok(())
    }

    pub fn load_compressed<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let mut decoder = Decoder::new(reader)?;
        Ok(serde_cbor::from_reader(&mut decoder)?)
    }

    /// Loads a list, picking the format from the file extension
    /// (`.cbor`, `.zstd`/`.zst`, anything else is packed text).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("cbor") => Self::deserialize_from_cbor(path),
            Some("zstd") | Some("zst") => Self::load_compressed(path),
            _ => Self::from_text_file(path),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.packed
    }

    /// Identifies the list inside block container headers.
    pub fn fingerprint(&self) -> u32 {
        word_hash(&self.packed)
    }

    /// Well-formed words with their byte offset in the packed buffer.
    pub fn words(&self) -> Words<'_> {
        Words {
            packed: &self.packed,
            pos: 0,
            done: false,
        }
    }

    pub fn len(&self) -> usize {
        self.words().count()
    }

    pub fn is_empty(&self) -> bool {
        self.words().next().is_none()
    }
}

/// Iterator over `(pos, word)` pairs of a packed list.
///
/// Parsing stops at the first NUL byte or at a final word with no terminating
/// delimiter.
pub struct Words<'a> {
    packed: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> Iterator for Words<'a> {
    type Item = (usize, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let packed = self.packed;

        while self.pos < packed.len() && is_delimiter(packed[self.pos]) {
            if packed[self.pos] == 0 {
                self.done = true;
                return None;
            }
            self.pos += 1;
        }

        let start = self.pos;
        while self.pos < packed.len() && !is_delimiter(packed[self.pos]) {
            self.pos += 1;
        }

        if self.pos >= packed.len() {
            // Empty tail or unterminated final word.
            self.done = true;
            return None;
        }

        Some((start, &packed[start..self.pos]))
    }
}
