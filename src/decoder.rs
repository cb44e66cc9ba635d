//! Inverse transform: expands references and rebuilds the dynamic dictionary from
//! its own output, in the same order the encoder built it.

use crate::char_class::{flip_case, is_delimiter, is_letter};
use crate::dictionary_lib::dict_entry::{is_indexable_length, word_hash, word_hash_flipped, WordSource};
use crate::dictionary_lib::DictionaryStore;
use crate::encoder::TransformStats;
use crate::error::{Result, TextCodecError};
use crate::escape::{EscapeCodec, Token};

pub struct InverseTransform<'a> {
    store: &'a mut DictionaryStore,
    escapes: EscapeCodec,
    case_folding: bool,
}

impl<'a> InverseTransform<'a> {
    pub fn new(store: &'a mut DictionaryStore, escapes: EscapeCodec, case_folding: bool) -> Self {
        Self {
            store,
            escapes,
            case_folding,
        }
    }

    /// Decodes `src` into `out` (cleared first), writing at most `limit` bytes.
    pub fn run(&mut self, src: &[u8], out: &mut Vec<u8>, limit: usize) -> Result<TransformStats> {
        out.clear();
        let mut stats = TransformStats::default();
        // Start of the current run of word bytes in `out`.
        let mut word_start = 0;
        // The current run was produced by a reference and must end here.
        let mut after_reference = false;

        let mut i = 0;
        while i < src.len() {
            let b = src[i];

            if self.escapes.is_escape(b) {
                let (token, consumed) = self.escapes.decode(src, i)?;
                match token {
                    Token::Literal(escape) => {
                        if after_reference {
                            return Err(TextCodecError::MisplacedReference { offset: i });
                        }
                        push(out, escape, limit)?;
                    }
                    Token::Reference { index, flipped } => {
                        if out.last().is_some_and(|&last| !is_delimiter(last)) {
                            return Err(TextCodecError::MisplacedReference { offset: i });
                        }
                        self.expand(index as usize, flipped, i, out, limit)?;
                        after_reference = true;
                        stats.references += 1;
                    }
                }
                i += consumed;
                continue;
            }

            if is_delimiter(b) {
                if !after_reference {
                    self.close_word(word_start, out, &mut stats);
                }
                after_reference = false;
                push(out, b, limit)?;
                word_start = out.len();
            } else {
                if after_reference {
                    return Err(TextCodecError::MisplacedReference { offset: i });
                }
                push(out, b, limit)?;
            }
            i += 1;
        }

        if !after_reference {
            self.close_word(word_start, out, &mut stats);
        }
        Ok(stats)
    }

    fn expand(
        &self,
        index: usize,
        flipped: bool,
        offset: usize,
        out: &mut Vec<u8>,
        limit: usize,
    ) -> Result<()> {
        let entry = *self.store.retrieve(index).ok_or(TextCodecError::InvalidIndex {
            index,
            size: self.store.len(),
            offset,
        })?;
        let len = entry.length as usize;
        if out.len() + len > limit {
            return Err(TextCodecError::OutputOverflow { capacity: limit });
        }

        let first = out.len();
        match entry.source {
            WordSource::Static => out.extend_from_slice(self.store.word(&entry, &[])),
            WordSource::Block => out.extend_from_within(entry.range()),
        }
        if flipped {
            out[first] = flip_case(out[first]);
        }
        Ok(())
    }

    /// Registers the literal word `out[word_start..]` unless the dictionary already
    /// knows it, exactly as the encoder decided when it met the same word.
    fn close_word(&mut self, word_start: usize, out: &[u8], stats: &mut TransformStats) {
        let word = &out[word_start..];
        if !is_indexable_length(word.len()) {
            return;
        }
        let hash = word_hash(word);
        if self.store.lookup(word, hash, out).is_some() {
            return;
        }
        if self.case_folding
            && is_letter(word[0])
            && self
                .store
                .lookup_case_flipped(word, word_hash_flipped(word), out)
                .is_some()
        {
            return;
        }
        match self.store.insert(word_start, word.len(), hash) {
            Some(_) => stats.inserted += 1,
            None => stats.refused += 1,
        }
    }
}

#[inline]
fn push(out: &mut Vec<u8>, b: u8, limit: usize) -> Result<()> {
    if out.len() >= limit {
        return Err(TextCodecError::OutputOverflow { capacity: limit });
    }
    out.push(b);
    Ok(())
}
