use once_cell::sync::Lazy;

/// Punctuation bytes that terminate a word, in addition to whitespace and control bytes.
///
/// `@`, `^`, `` ` `` and `~` are deliberately absent: they stay inside words, which is
/// also why the default escape bytes are picked from that group.
pub const PUNCTUATION_DELIMITERS: &[u8] = b"!\"#$%&'()*+,-./:;<=>?[\\]_{|}";

/// Compact 256-bit membership set for byte classes.
///
/// # Design
///
/// * Every byte value maps to one bit in a `[u64; 4]` table (32 bytes total).
/// * Testing membership is one shift and one bitwise AND, with no branches on the
///   byte value itself.
///
/// The sets are built once at first use (see [`DELIMITER_SET`] and [`TEXT_SET`])
/// and never mutated afterwards, so they are freely shared between threads.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ByteClassSet {
    bits: [u64; 4],
}

impl ByteClassSet {
    const fn empty() -> Self {
        Self { bits: [0; 4] }
    }

    fn insert(&mut self, b: u8) {
        self.bits[(b >> 6) as usize] |= 1u64 << (b & 63);
    }

    fn insert_range(&mut self, lo: u8, hi: u8) {
        for b in lo..=hi {
            self.insert(b);
        }
    }

    /// Tests whether `b` belongs to this set.
    ///
    /// # Examples
    ///
    /// ```
    /// use textcodec::char_class::DELIMITER_SET;
    /// assert!(DELIMITER_SET.contains(b' '));
    /// assert!(!DELIMITER_SET.contains(b'a'));
    /// ```
    #[inline]
    pub fn contains(&self, b: u8) -> bool {
        (self.bits[(b >> 6) as usize] >> (b & 63)) & 1 == 1
    }

    /// Number of byte values in the set.
    pub fn len(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bytes that end a word: control bytes, space, DEL and [`PUNCTUATION_DELIMITERS`].
pub static DELIMITER_SET: Lazy<ByteClassSet> = Lazy::new(|| {
    let mut set = ByteClassSet::empty();
    set.insert_range(0x00, 0x20);
    set.insert(0x7F);
    for &b in PUNCTUATION_DELIMITERS {
        set.insert(b);
    }
    set
});

/// Bytes considered normal text: printable ASCII, `\t`, `\n`, `\r` and every
/// byte `>= 0x80` (UTF-8 sequences).
pub static TEXT_SET: Lazy<ByteClassSet> = Lazy::new(|| {
    let mut set = ByteClassSet::empty();
    set.insert_range(0x20, 0x7E);
    set.insert(b'\t');
    set.insert(b'\n');
    set.insert(b'\r');
    set.insert_range(0x80, 0xFF);
    set
});

#[inline]
pub fn is_delimiter(b: u8) -> bool {
    DELIMITER_SET.contains(b)
}

#[inline]
pub fn is_text(b: u8) -> bool {
    TEXT_SET.contains(b)
}

/// A byte that may appear inside a word. Every byte is either a delimiter or a
/// word byte.
#[inline]
pub fn is_word_byte(b: u8) -> bool {
    is_text(b) && !is_delimiter(b)
}

#[inline]
pub fn is_lower_case(b: u8) -> bool {
    b.is_ascii_lowercase()
}

#[inline]
pub fn is_upper_case(b: u8) -> bool {
    b.is_ascii_uppercase()
}

#[inline]
pub fn is_letter(b: u8) -> bool {
    is_lower_case(b) || is_upper_case(b)
}

/// Toggles the case of an ASCII letter; any other byte is returned unchanged.
#[inline]
pub fn flip_case(b: u8) -> u8 {
    if is_letter(b) {
        b ^ 0x20
    } else {
        b
    }
}

/// Quick check run before encoding a block: more than a quarter of non-text
/// bytes means the block is binary and not worth transforming.
pub fn looks_like_text(block: &[u8]) -> bool {
    let non_text = block.iter().filter(|&&b| !is_text(b)).count();
    non_text * 4 <= block.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_byte_is_delimiter_or_word_byte() {
        for b in 0..=255u8 {
            assert_ne!(is_delimiter(b), is_word_byte(b), "byte {b:#04x}");
        }
    }

    #[test]
    fn default_escapes_are_word_bytes() {
        assert!(is_word_byte(b'@'));
        assert!(is_word_byte(b'^'));
        assert!(is_delimiter(b'\n'));
        assert!(is_delimiter(b'_'));
        assert!(is_word_byte(0xC3));
    }

    #[test]
    fn case_helpers() {
        assert_eq!(flip_case(b'a'), b'A');
        assert_eq!(flip_case(b'Z'), b'z');
        assert_eq!(flip_case(b'1'), b'1');
        assert!(is_upper_case(b'Q') && !is_lower_case(b'Q'));
    }

    #[test]
    fn binary_blocks_are_not_text() {
        assert!(looks_like_text(b"plain words, with punctuation.\n"));
        assert!(!looks_like_text(&[0u8, 1, 2, 3, 4, 5, 6, b'a']));
        assert!(looks_like_text(b""));
    }
}
