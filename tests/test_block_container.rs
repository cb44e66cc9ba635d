use std::sync::Arc;

use textcodec::block::{BlockCodec, HEADER_LEN};
use textcodec::{TextCodecConfig, TextCodecError, WordList, DEFAULT_WORD_LIST};

fn config() -> TextCodecConfig {
    TextCodecConfig::default().with_log_hash_size(16)
}

fn block_codec(block_size: usize, parallel: bool) -> BlockCodec {
    let mut codec = BlockCodec::new(config(), Arc::clone(&DEFAULT_WORD_LIST)).unwrap();
    codec.set_block_size(block_size).unwrap();
    codec.set_parallel(parallel);
    codec
}

fn corpus() -> Vec<u8> {
    let mut text = String::new();
    for i in 0..400 {
        text.push_str(&format!(
            "Line {i}: the quick brown fox jumps over the lazy dog, and the dog sleeps again.\n"
        ));
    }
    text.into_bytes()
}

#[test]
fn test_multi_block_roundtrip() {
    let src = corpus();
    let codec = block_codec(4096, false);
    let (encoded, stats) = codec.encode_with_stats(&src).unwrap();
    assert!(stats.blocks > 1);
    // Only a short trailing block may be left raw.
    assert!(stats.transformed + 1 >= stats.blocks);
    assert!(encoded.len() < src.len());
    assert_eq!(codec.decode(&encoded).unwrap(), src);
}

#[test]
fn test_parallel_matches_sequential() {
    let src = corpus();
    let sequential = block_codec(2048, false).encode(&src).unwrap();
    let parallel = block_codec(2048, true).encode(&src).unwrap();
    assert_eq!(sequential, parallel);
    assert_eq!(block_codec(2048, true).decode(&parallel).unwrap(), src);
}

#[test]
fn test_binary_blocks_are_stored_raw() {
    let mut src = corpus();
    src.extend((0..3000u32).map(|i| (i % 7) as u8));
    let codec = block_codec(8192, true);
    let (encoded, stats) = codec.encode_with_stats(&src).unwrap();
    assert!(stats.transformed < stats.blocks);
    assert_eq!(codec.decode(&encoded).unwrap(), src);
}

#[test]
fn test_config_mismatch_is_rejected() {
    let src = corpus();
    let encoded = block_codec(4096, false).encode(&src).unwrap();

    let other = BlockCodec::new(config().with_log_hash_size(18), Arc::clone(&DEFAULT_WORD_LIST)).unwrap();
    assert!(matches!(other.decode(&encoded), Err(TextCodecError::Container(_))));

    let other = BlockCodec::new(config().with_case_folding(false), Arc::clone(&DEFAULT_WORD_LIST)).unwrap();
    assert!(matches!(other.decode(&encoded), Err(TextCodecError::Container(_))));

    let words = Arc::new(WordList::from_words(["quick", "brown"]).unwrap());
    let other = BlockCodec::new(config(), words).unwrap();
    assert!(matches!(other.decode(&encoded), Err(TextCodecError::Container(_))));
}

#[test]
fn test_corrupt_container_is_rejected() {
    let src = corpus();
    let codec = block_codec(4096, false);
    let encoded = codec.encode(&src).unwrap();

    let mut bad_magic = encoded.clone();
    bad_magic[0] = b'X';
    assert!(matches!(codec.decode(&bad_magic), Err(TextCodecError::Container(_))));

    let mut bad_flags = encoded.clone();
    bad_flags[HEADER_LEN] = 0x30;
    assert!(matches!(codec.decode(&bad_flags), Err(TextCodecError::Container(_))));

    let mut trailing = encoded.clone();
    trailing.push(0);
    assert!(matches!(codec.decode(&trailing), Err(TextCodecError::Container(_))));
}
