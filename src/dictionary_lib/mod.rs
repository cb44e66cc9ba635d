//! Dictionary for the word substitution codec.
//!
//! * [`word_list`] holds static word lists: the compiled-in English list and
//!   custom lists loaded from packed text, CBOR or Zstd artifacts.
//! * [`dictionary_store`] is the indexed dictionary both sides of the codec grow in
//!   lockstep: static words first, then every new word met in the current block.
//! * [`dict_entry`] defines entries and the word hash.

pub mod dict_entry;
pub mod dictionary_store;
pub mod word_list;

pub use dict_entry::{
    word_hash, word_hash_flipped, DictEntry, WordSource, MAX_WORD_LENGTH, MIN_WORD_LENGTH,
};
pub use dictionary_store::{create_dictionary, DictionaryStore, EMPTY_SLOT};
pub use word_list::{WordList, DEFAULT_WORD_LIST};
