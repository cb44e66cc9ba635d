//! Forward transform: replaces known words by short dictionary references.

use log::trace;

use crate::char_class::{is_delimiter, is_letter, looks_like_text};
use crate::dictionary_lib::dict_entry::{is_indexable_length, word_hash, word_hash_flipped};
use crate::dictionary_lib::DictionaryStore;
use crate::error::{Result, TextCodecError};
use crate::escape::EscapeCodec;

/// Counters of one forward or inverse call, used for logging.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TransformStats {
    /// Words written as (or expanded from) references.
    pub references: usize,
    /// Words added to the dynamic dictionary.
    pub inserted: usize,
    /// Words that could not be added because the dictionary was full.
    pub refused: usize,
}

pub struct ForwardTransform<'a> {
    store: &'a mut DictionaryStore,
    escapes: EscapeCodec,
    case_folding: bool,
}

impl<'a> ForwardTransform<'a> {
    pub fn new(store: &'a mut DictionaryStore, escapes: EscapeCodec, case_folding: bool) -> Self {
        Self {
            store,
            escapes,
            case_folding,
        }
    }

    /// Encodes `src` into `out` (cleared first), writing at most `limit` bytes.
    ///
    /// `limit` is the destination capacity; the effective bound is
    /// `min(limit, src.len())` since the transform must shrink the block.
    pub fn run(&mut self, src: &[u8], out: &mut Vec<u8>, limit: usize) -> Result<TransformStats> {
        out.clear();
        let mut stats = TransformStats::default();
        let n = src.len();
        if n == 0 {
            return Ok(stats);
        }
        if !looks_like_text(src) {
            return Err(TextCodecError::NotCompressible { input: n });
        }

        let bound = limit.min(n);
        let overflow = || {
            if limit < n {
                TextCodecError::OutputOverflow { capacity: limit }
            } else {
                TextCodecError::NotCompressible { input: n }
            }
        };

        let mut anchor = 0;
        let mut i = 0;
        while i < n {
            if is_delimiter(src[i]) {
                i += 1;
                continue;
            }

            // Runs of word bytes are maximal, so each one sits between delimiters
            // or buffer ends.
            let start = i;
            while i < n && !is_delimiter(src[i]) {
                i += 1;
            }
            let word = &src[start..i];
            if !is_indexable_length(word.len()) {
                continue;
            }

            let hash = word_hash(word);
            let hit = match self.store.lookup(word, hash, src) {
                Some(index) => Some((index, false)),
                None if self.case_folding && is_letter(word[0]) => self
                    .store
                    .lookup_case_flipped(word, word_hash_flipped(word), src)
                    .map(|index| (index, true)),
                None => None,
            };

            match hit {
                Some((index, flipped)) => {
                    // A reference that saves nothing is left as a literal.
                    if EscapeCodec::reference_len(index) < word.len() {
                        self.copy_literal(&src[anchor..start], out, bound)
                            .map_err(|_| overflow())?;
                        if out.len() + EscapeCodec::reference_len(index) > bound {
                            return Err(overflow());
                        }
                        self.escapes.write_reference(index, flipped, out);
                        anchor = i;
                        stats.references += 1;
                    }
                }
                None => match self.store.insert(start, word.len(), hash) {
                    Some(_) => stats.inserted += 1,
                    None => {
                        if stats.refused == 0 {
                            trace!(
                                "dictionary full ({} entries), new words are no longer indexed",
                                self.store.len()
                            );
                        }
                        stats.refused += 1;
                    }
                },
            }
        }

        self.copy_literal(&src[anchor..], out, bound)
            .map_err(|_| overflow())?;

        if out.len() >= n {
            return Err(TextCodecError::NotCompressible { input: n });
        }
        Ok(stats)
    }

    /// Copies source bytes, writing escape bytes as literal tokens.
    fn copy_literal(&self, bytes: &[u8], out: &mut Vec<u8>, bound: usize) -> std::result::Result<(), ()> {
        let mut rest = bytes;
        while !rest.is_empty() {
            let plain = rest
                .iter()
                .position(|&b| self.escapes.is_escape(b))
                .unwrap_or(rest.len());
            if out.len() + plain > bound {
                return Err(());
            }
            out.extend_from_slice(&rest[..plain]);
            rest = &rest[plain..];

            if let Some(&escape) = rest.first() {
                if out.len() + 3 > bound {
                    return Err(());
                }
                self.escapes.write_literal(escape, out);
                rest = &rest[1..];
            }
        }
        Ok(())
    }
}
