use super::*;

#[test]
fn ascii_columns_are_byte_offsets() {
    let line = "function foo(x) = x";
    assert_eq!(byte_offset_of_utf16_column(line, 9), 9);
    assert_eq!(utf16_column_of_byte_offset(line, 12), 12);
}

#[test]
fn multibyte_prefix_shifts_byte_offsets() {
    // 'é' is 2 bytes in UTF-8 but one UTF-16 unit.
    let line = "// é";
    assert_eq!(byte_offset_of_utf16_column(line, 4), 5);
    assert_eq!(utf16_column_of_byte_offset(line, 5), 4);
}

#[test]
fn astral_characters_take_two_utf16_units() {
    let line = "\u{1F600} Some";
    assert_eq!(byte_offset_of_utf16_column(line, 3), 5);
    assert_eq!(utf16_column_of_byte_offset(line, 5), 3);
}

#[test]
fn columns_past_end_clamp() {
    assert_eq!(byte_offset_of_utf16_column("abc", 99), 3);
    assert_eq!(utf16_column_of_byte_offset("abc", 99), 3);
}

#[test]
fn offsets_inside_a_char_round_down() {
    let line = "é";
    assert_eq!(utf16_column_of_byte_offset(line, 1), 0);
}
