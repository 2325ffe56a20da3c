use once_cell::sync::Lazy;
use regex::Regex;

static NON_IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("static regex is valid"));

/// A maximal identifier run inside a single line.
///
/// `start..end` is a byte range of the line and every byte in it is
/// `[A-Za-z0-9_]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

pub fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Start offset of the last match of `pattern` found in `text[..from]`.
pub fn last_index_of_regex(
    text: &str,
    pattern: &Regex,
    from: usize,
) -> Option<usize> {
    let mut end = from.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    pattern.find_iter(&text[..end]).last().map(|m| m.start())
}

/// Identifier containing `offset`, or ending right before it.
///
/// A cursor placed just past the last character of a word still selects
/// that word. Returns `None` when neither side of `offset` is an identifier
/// character.
pub fn identifier_at(
    line: &str,
    offset: usize,
) -> Option<Token> {
    let bytes = line.as_bytes();
    let offset = offset.min(bytes.len());
    let anchor = if bytes.get(offset).copied().is_some_and(is_identifier_byte) {
        offset
    } else if offset > 0 && is_identifier_byte(bytes[offset - 1]) {
        offset - 1
    } else {
        return None;
    };

    let start = bytes[..anchor].iter().rposition(|&b| !is_identifier_byte(b)).map_or(0, |i| i + 1);
    let end = bytes[anchor..].iter().position(|&b| !is_identifier_byte(b)).map_or(bytes.len(), |i| anchor + i);

    Some(Token {
        text: line[start..end].to_string(),
        start,
        end,
    })
}

/// Widen a substring match at `match_start..match_end` to the full
/// identifier around it.
///
/// Scans backward to the nearest non-identifier character before the match
/// and forward to the nearest one after it, both exclusive.
pub fn expand_to_identifier(
    line: &str,
    match_start: usize,
    match_end: usize,
) -> Token {
    let match_end = match_end.min(line.len());
    let start = last_index_of_regex(line, &NON_IDENTIFIER, match_start).map_or(0, |i| i + 1);
    let end = line[match_end..].find(|c: char| !is_identifier_char(c)).map_or(line.len(), |i| match_end + i);
    let start = start.min(end);

    Token {
        text: line[start..end].to_string(),
        start,
        end,
    }
}

#[cfg(test)]
#[path = "../../tests/src/definition/boundary_tests.rs"]
mod tests;
