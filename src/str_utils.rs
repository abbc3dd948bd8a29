/// Number of characters in `s`. Leaf weights and all public offsets count
/// characters, not bytes.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of the `char_idx`th character of `s`, with `char_idx` equal
/// to the character count mapping to `s.len()`. `None` if `char_idx` lies
/// beyond the end of `s`.
pub fn byte_of_char_idx(s: &str, char_idx: usize) -> Option<usize> {
    s.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(s.len()))
        .nth(char_idx)
}
