//! The dictionary shared by encoder and decoder.
//!
//! Entries live in insertion order in a vector, so a word's index is its position
//! there. A direct-mapped hash index (`1 << log_hash_size` slots, one `u16` each)
//! finds the candidate entry for a word. Collisions are resolved by overwriting:
//! the most recent word owns the slot and older colliding words become unreachable
//! by lookup, but stay retrievable by index.

use std::sync::Arc;

use log::debug;
use rustc_hash::FxHashSet;

use crate::char_class::flip_case;
use crate::dictionary_lib::dict_entry::{is_indexable_length, word_hash, DictEntry, WordSource};
use crate::dictionary_lib::word_list::WordList;

/// Marks a hash slot that holds no entry.
pub const EMPTY_SLOT: u16 = u16::MAX;

#[derive(Debug, Clone)]
pub struct DictionaryStore {
    entries: Vec<DictEntry>,
    hash_index: Vec<u16>,
    hash_mask: u32,
    capacity: usize,
    static_size: usize,
    static_words: Arc<WordList>,
}

impl DictionaryStore {
    /// An empty store. `capacity` must not exceed 32768 (indices are 15 bits).
    pub fn new(log_hash_size: u32, capacity: usize) -> Self {
        let slots = 1usize << log_hash_size;
        Self {
            entries: Vec::with_capacity(capacity),
            hash_index: vec![EMPTY_SLOT; slots],
            hash_mask: (slots - 1) as u32,
            capacity,
            static_size: 0,
            static_words: Arc::new(WordList::default()),
        }
    }

    #[inline]
    fn slot(&self, hash: u32) -> usize {
        (hash & self.hash_mask) as usize
    }

    /// The bytes an entry refers to. `block` is the buffer of the current call.
    #[inline]
    pub fn word<'a>(&'a self, entry: &DictEntry, block: &'a [u8]) -> &'a [u8] {
        let buf = match entry.source {
            WordSource::Static => self.static_words.as_bytes(),
            WordSource::Block => block,
        };
        buf.get(entry.range()).unwrap_or(&[])
    }

    /// Index of `word` if its slot holds exactly this word.
    pub fn lookup(&self, word: &[u8], hash: u32, block: &[u8]) -> Option<u16> {
        let entry = self.candidate(hash, word.len())?;
        (self.word(entry, block) == word).then_some(entry.index)
    }

    /// Index of `word` with its first byte case-flipped, if present.
    /// `hash_flipped` must be the hash of that flipped form.
    pub fn lookup_case_flipped(&self, word: &[u8], hash_flipped: u32, block: &[u8]) -> Option<u16> {
        let entry = self.candidate(hash_flipped, word.len())?;
        let stored = self.word(entry, block);
        match (stored.split_first(), word.split_first()) {
            (Some((&s0, s_rest)), Some((&w0, w_rest))) if s0 == flip_case(w0) && s_rest == w_rest => {
                Some(entry.index)
            }
            _ => None,
        }
    }

    fn candidate(&self, hash: u32, len: usize) -> Option<&DictEntry> {
        let index = self.hash_index[self.slot(hash)];
        if index == EMPTY_SLOT {
            return None;
        }
        self.entries
            .get(index as usize)
            .filter(|e| e.hash == hash && e.length as usize == len)
    }

    /// Adds a word of the current block. Returns `None` once the store is full.
    pub fn insert(&mut self, pos: usize, length: usize, hash: u32) -> Option<u16> {
        self.push(pos, length, hash, WordSource::Block)
    }

    fn push(&mut self, pos: usize, length: usize, hash: u32, source: WordSource) -> Option<u16> {
        if self.is_full() {
            return None;
        }
        let index = self.entries.len() as u16;
        self.entries.push(DictEntry {
            hash,
            pos,
            index,
            length: length as u16,
            source,
        });
        let slot = self.slot(hash);
        self.hash_index[slot] = index;
        Some(index)
    }

    pub fn retrieve(&self, index: usize) -> Option<&DictEntry> {
        self.entries.get(index)
    }

    /// Drops every dynamic entry and restores the state right after seeding.
    pub fn reset(&mut self) {
        if self.entries.len() == self.static_size {
            return;
        }
        for i in self.static_size..self.entries.len() {
            let slot = self.slot(self.entries[i].hash);
            self.hash_index[slot] = EMPTY_SLOT;
        }
        self.entries.truncate(self.static_size);
        // Dynamic words may have taken over static slots; replay seeding order.
        for i in 0..self.static_size {
            let slot = self.slot(self.entries[i].hash);
            self.hash_index[slot] = self.entries[i].index;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn static_size(&self) -> usize {
        self.static_size
    }

    pub fn dynamic_len(&self) -> usize {
        self.entries.len() - self.static_size
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn static_words(&self) -> &Arc<WordList> {
        &self.static_words
    }
}

/// Seeds `store` with up to `max_words` words of `words`, starting at the current
/// insertion index. Duplicates and words outside the length bounds are skipped.
///
/// A store is tied to one word list: seeding from a different list first clears
/// everything the store holds. Returns the number of words installed.
pub fn create_dictionary(words: &Arc<WordList>, store: &mut DictionaryStore, max_words: usize) -> usize {
    if !Arc::ptr_eq(words, &store.static_words) {
        for slot in store.hash_index.iter_mut() {
            *slot = EMPTY_SLOT;
        }
        store.entries.clear();
        store.static_size = 0;
        store.static_words = Arc::clone(words);
    } else {
        store.reset();
    }

    let mut seen: FxHashSet<&[u8]> = FxHashSet::default();
    for e in &store.entries {
        if let Some(w) = words.as_bytes().get(e.range()) {
            seen.insert(w);
        }
    }

    let mut installed = 0;
    for (pos, word) in words.words() {
        if installed >= max_words || store.is_full() {
            break;
        }
        if !is_indexable_length(word.len()) || !seen.insert(word) {
            continue;
        }
        if store.push(pos, word.len(), word_hash(word), WordSource::Static).is_none() {
            break;
        }
        installed += 1;
    }
    store.static_size = store.entries.len();

    debug!(
        "seeded {} static words ({} slots, capacity {})",
        installed,
        store.hash_index.len(),
        store.capacity
    );
    installed
}
