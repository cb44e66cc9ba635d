use crate::char_class::is_delimiter;

/// Finds a block boundary that does not cut a word, limited by a maximum byte count.
///
/// Backtracks from `max` to just after the last delimiter at or before `max - 1`,
/// so the returned prefix ends on a word boundary.
///
/// # How it works
/// - If `bytes` is not longer than `max`, the full length is returned.
/// - Otherwise the prefix ends right after the last delimiter in `bytes[..max]`.
/// - A prefix with no delimiter at all cannot be split cleanly; `max` is returned
///   and the word is cut.
///
/// # Example
/// ```rust
/// use textcodec::utils::find_delimiter_boundary;
///
/// let text = b"alpha beta gamma";
/// assert_eq!(find_delimiter_boundary(text, 8), 6); // "alpha "
/// assert_eq!(find_delimiter_boundary(text, 100), text.len());
/// ```
pub fn find_delimiter_boundary(bytes: &[u8], max: usize) -> usize {
    if bytes.len() <= max {
        return bytes.len();
    }
    match bytes[..max].iter().rposition(|&b| is_delimiter(b)) {
        Some(i) => i + 1,
        None => max,
    }
}

/// Formats `n` with a comma every three digits, e.g. `1234567` -> `"1,234,567"`.
pub fn format_thousand(n: usize) -> String {
    let mut result_str = n.to_string();
    let mut offset = result_str.len() % 3;
    if offset == 0 {
        offset = 3;
    }

    while offset < result_str.len() {
        result_str.insert(offset, ',');
        offset += 4; // Including the added comma
    }
    result_str
}
