/// Convert a character index to a byte offset
///
/// Word split requests address characters, not bytes, so that a split
/// inside a multi-byte token (accents, CJK, apostrophe variants) always
/// lands on a char boundary.
///
/// # Arguments
/// * `text` - The word text
/// * `char_index` - Number of chars preceding the offset
///
/// # Returns
/// * `Some(byte_offset)` when `char_index <= char_len(text)`
/// * `None` if the index is past the end
pub fn char_to_byte(text: &str, char_index: usize) -> Option<usize> {
    if char_index == 0 {
        return Some(0);
    }

    match text.char_indices().nth(char_index) {
        Some((byte_offset, _)) => Some(byte_offset),
        None if char_len(text) == char_index => Some(text.len()),
        None => None,
    }
}

/// Number of chars in `text`
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split `text` into two non-empty halves at a character index
///
/// # Returns
/// * `Some((head, tail))` when `0 < char_index < char_len(text)`
/// * `None` otherwise
pub fn split_at_char(text: &str, char_index: usize) -> Option<(&str, &str)> {
    if char_index == 0 || char_index >= char_len(text) {
        return None;
    }

    let byte_offset = char_to_byte(text, char_index)?;
    Some(text.split_at(byte_offset))
}
