//! Conversions between LSP columns (UTF-16 code units) and byte offsets
//! within a single line.

/// Byte offset of the UTF-16 column `character` in `line`.
///
/// Columns past the end of the line clamp to `line.len()`.
pub fn byte_offset_of_utf16_column(
    line: &str,
    character: u32,
) -> usize {
    let mut utf16_offset = 0u32;
    for (byte_offset, ch) in line.char_indices() {
        if utf16_offset >= character {
            return byte_offset;
        }
        utf16_offset += ch.len_utf16() as u32;
    }
    line.len()
}

pub fn utf16_column_of_byte_offset(
    line: &str,
    byte_offset: usize,
) -> u32 {
    let mut end = byte_offset.min(line.len());
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    line[..end].encode_utf16().count() as u32
}

#[cfg(test)]
#[path = "../tests/src/text_pos_tests.rs"]
mod tests;
