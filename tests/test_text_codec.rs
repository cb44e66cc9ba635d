use std::sync::Arc;

use textcodec::dictionary_lib::word_hash;
use textcodec::{TextCodec, TextCodecConfig, TextCodecError, WordList};

fn small_config() -> TextCodecConfig {
    TextCodecConfig::default().with_log_hash_size(16)
}

#[test]
fn test_the_cat_sat_on_the_mat() {
    // "the" lands at index 5 and "cat" at index 12.
    let dict = b"aa bb cc dd ee the ff gg hh ii jj kk cat\n";
    let mut codec = TextCodec::with_dictionary(dict, TextCodecConfig::default()).unwrap();
    assert_eq!(codec.static_dictionary_len(), 13);

    let src = b"the cat sat on the mat";
    let mut dst = vec![0u8; codec.max_encoded_len(src.len())];
    let n = codec.forward(src, &mut dst).unwrap();
    assert_eq!(&dst[..n], b"@\x05 @\x0c sat on @\x05 mat");
    // sat, on and mat were registered as 13, 14 and 15.
    assert_eq!(codec.dictionary_len(), 16);

    let mut decoder = TextCodec::with_dictionary(dict, TextCodecConfig::default()).unwrap();
    let mut back = vec![0u8; src.len()];
    let m = decoder.inverse(&dst[..n], &mut back).unwrap();
    assert_eq!(&back[..m], src);
    assert_eq!(decoder.dictionary_len(), 16);
}

#[test]
fn test_roundtrip_english_text() {
    let src = b"It was the best of times, it was the worst of times, it was the age of \
wisdom, it was the age of foolishness, it was the epoch of belief, it was the epoch of \
incredulity, it was the season of Light, it was the season of Darkness.";
    let mut codec = TextCodec::with_config(small_config()).unwrap();
    let encoded = codec.forward_to_vec(src).unwrap();
    assert!(encoded.len() < src.len());
    assert_eq!(codec.inverse_to_vec(&encoded).unwrap(), src.to_vec());
}

#[test]
fn test_non_expansion_is_reported_as_failure() {
    let mut codec = TextCodec::new();
    let src = b"zq xv";
    let mut dst = [0u8; 5];
    let err = codec.forward(src, &mut dst).unwrap_err();
    assert!(matches!(err, TextCodecError::NotCompressible { input: 5 }));
    assert!(err.is_recoverable());
}

#[test]
fn test_small_destination_is_overflow() {
    let mut codec = TextCodec::new();
    let src = b"the house and the garden and the window of the house";
    let mut dst = [0u8; 6];
    let err = codec.forward(src, &mut dst).unwrap_err();
    assert!(matches!(err, TextCodecError::OutputOverflow { capacity: 6 }));
}

#[test]
fn test_determinism_across_instances() {
    let src = b"Some new words, some old words, and some words that repeat and repeat.";
    let mut a = TextCodec::with_config(small_config()).unwrap();
    let mut b = TextCodec::with_config(small_config()).unwrap();
    assert_eq!(a.forward_to_vec(src).unwrap(), b.forward_to_vec(src).unwrap());
}

#[test]
fn test_dictionaries_stay_in_sync() {
    let src = b"Repeat repeat REPEAT, again and again: the same words, the same WORDS.";
    let mut enc = TextCodec::with_config(small_config()).unwrap();
    let mut dec = TextCodec::with_config(small_config()).unwrap();
    let encoded = enc.forward_to_vec(src).unwrap();
    assert_eq!(dec.inverse_to_vec(&encoded).unwrap(), src.to_vec());
    assert_eq!(enc.dictionary_len(), dec.dictionary_len());
}

#[test]
fn test_escape_literals_roundtrip() {
    let src = b"price: 10@20^30 and the price of the house, the garden and the window";
    let mut codec = TextCodec::new();
    let encoded = codec.forward_to_vec(src).unwrap();
    assert!(encoded.windows(3).any(|w| w == b"@\x80\x00"));
    assert!(encoded.windows(3).any(|w| w == b"^\x80\x00"));
    assert_eq!(codec.inverse_to_vec(&encoded).unwrap(), src.to_vec());
}

#[test]
fn test_case_folding_shares_entries() {
    let mut folding = TextCodec::new();
    let mut exact = TextCodec::with_config(TextCodecConfig::default().with_case_folding(false)).unwrap();
    let src = b"House house House house";
    let a = folding.forward_to_vec(src).unwrap();
    assert_eq!(a.iter().filter(|&&b| b == b'^').count(), 2);
    let b = exact.forward_to_vec(src).unwrap();
    assert!(!b.contains(&b'^'));
    assert_eq!(folding.inverse_to_vec(&a).unwrap(), src.to_vec());
    assert_eq!(exact.inverse_to_vec(&b).unwrap(), src.to_vec());
}

#[test]
fn test_colliding_words_never_alias() {
    // 256 slots: find a 4-letter word sharing "alpha"'s slot.
    let mask = 0xFF;
    let target = word_hash(b"alpha") & mask;
    let mut collider = None;
    'search: for a in b'a'..=b'z' {
        for b in b'a'..=b'z' {
            for c in b'a'..=b'z' {
                for d in b'a'..=b'z' {
                    let w = [a, b, c, d];
                    if word_hash(&w) & mask == target {
                        collider = Some(w);
                        break 'search;
                    }
                }
            }
        }
    }
    let w = String::from_utf8(collider.expect("collision in 256 slots").to_vec()).unwrap();

    let cfg = TextCodecConfig::default().with_log_hash_size(8);
    let words = Arc::new(WordList::from_words(["alpha"]).unwrap());
    let src = format!(
        "{w} alpha {w} alpha internationalization internationalization internationalization"
    );
    let mut enc = TextCodec::with_word_list(Arc::clone(&words), cfg).unwrap();
    let mut dec = TextCodec::with_word_list(words, cfg).unwrap();
    let encoded = enc.forward_to_vec(src.as_bytes()).unwrap();
    assert_eq!(dec.inverse_to_vec(&encoded).unwrap(), src.as_bytes());
}

#[test]
fn test_capacity_boundary() {
    // Room for only four dynamic words.
    let cfg = small_config().with_dict_size(1028);
    let mut enc = TextCodec::with_config(cfg).unwrap();
    let mut dec = TextCodec::with_config(cfg).unwrap();

    let mut src = String::new();
    for i in 0..50 {
        src.push_str(&format!("qx{i:03} the house "));
    }
    for i in 0..50 {
        src.push_str(&format!("qx{i:03} "));
    }
    let encoded = enc.forward_to_vec(src.as_bytes()).unwrap();
    assert_eq!(enc.dictionary_len(), 1028);
    assert_eq!(dec.inverse_to_vec(&encoded).unwrap(), src.as_bytes());
    assert_eq!(dec.dictionary_len(), 1028);
}

#[test]
fn test_more_words_than_dictionary_size() {
    let cfg = TextCodecConfig::default().with_log_hash_size(20);
    let mut enc = TextCodec::with_config(cfg).unwrap();
    let mut dec = TextCodec::with_config(cfg).unwrap();

    let mut src = String::new();
    for i in 0..33_000 {
        src.push_str(&format!("w{i:05} the house\n"));
    }
    let encoded = enc.forward_to_vec(src.as_bytes()).unwrap();
    assert_eq!(enc.dictionary_len(), 32_768);
    assert_eq!(dec.inverse_to_vec(&encoded).unwrap(), src.as_bytes());
}

#[test]
fn test_corrupt_streams_are_rejected() {
    let mut codec = TextCodec::new();
    assert!(matches!(
        codec.inverse_to_vec(b"abc @"),
        Err(TextCodecError::TruncatedEscape { offset: 4 })
    ));
    assert!(matches!(
        codec.inverse_to_vec(b"@\xff\xff"),
        Err(TextCodecError::InvalidIndex { index: 32767, size: 1024, offset: 0 })
    ));
    assert!(matches!(
        codec.inverse_to_vec(b"@\x80\x10"),
        Err(TextCodecError::MalformedEscape { offset: 0 })
    ));
    let mut dst = [0u8; 2];
    assert!(matches!(
        codec.inverse(b"@\x00", &mut dst),
        Err(TextCodecError::OutputOverflow { capacity: 2 })
    ));
}

#[test]
fn test_instance_is_reusable() {
    let mut codec = TextCodec::with_config(small_config()).unwrap();
    let first = b"alpha beta gamma alpha beta gamma";
    let second = b"delta epsilon delta epsilon delta";
    let e1 = codec.forward_to_vec(first).unwrap();
    let e2 = codec.forward_to_vec(second).unwrap();
    assert_eq!(codec.inverse_to_vec(&e1).unwrap(), first.to_vec());
    assert_eq!(codec.inverse_to_vec(&e2).unwrap(), second.to_vec());
}
