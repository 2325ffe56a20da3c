use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};

use crate::{
    definition::boundary::{expand_to_identifier, is_identifier_char},
    search::RawHit,
    text_pos::utf16_column_of_byte_offset,
};

const FUNCTION_KEYWORD: &str = "function";

/// A span on one line of a file. `line` is 0-based and the columns are
/// UTF-16 code units, end exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedLocation {
    pub file_path: PathBuf,
    pub line: u32,
    pub start_column: u32,
    pub end_column: u32,
}

impl ResolvedLocation {
    fn on_hit(
        root: &Path,
        hit: &RawHit,
        start: usize,
        end: usize,
    ) -> Option<Self> {
        let line = hit.line.checked_sub(1)?;
        Some(Self {
            file_path: root.join(&hit.path),
            line,
            start_column: utf16_column_of_byte_offset(&hit.text, start),
            end_column: utf16_column_of_byte_offset(&hit.text, end),
        })
    }
}

/// Span of the first occurrence of `highlight` on the hit's line.
///
/// `None` when the text does not occur there; such hits are dropped rather
/// than reported with a bogus range.
pub fn locate(
    root: &Path,
    hit: &RawHit,
    highlight: &str,
) -> Option<ResolvedLocation> {
    if highlight.is_empty() {
        return None;
    }
    let start = hit.text.find(highlight)?;
    ResolvedLocation::on_hit(root, hit, start, start + highlight.len())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedSymbol {
    pub name: String,
    pub location: ResolvedLocation,
}

/// Recovers full function names from lines matched by a partial query.
pub struct FuzzyLocator {
    query: String,
    regex: Option<Regex>,
}

impl FuzzyLocator {
    pub fn new(query: &str) -> Self {
        let regex = RegexBuilder::new(&format!("{FUNCTION_KEYWORD}(.*?)({query})"))
            .case_insensitive(true)
            .build()
            .ok();
        Self {
            query: query.to_string(),
            regex,
        }
    }

    /// The identifier around the first occurrence of the query after the
    /// `function` keyword, as name and span.
    pub fn locate(
        &self,
        root: &Path,
        hit: &RawHit,
    ) -> Option<LocatedSymbol> {
        let (start, end) = self.query_span(&hit.text)?;
        let end = hit.text[start..end].find(|c: char| !is_identifier_char(c)).map_or(end, |i| start + i);
        let (start, end) = if start == end {
            let anchor = hit.text[start..].find(is_identifier_char).map(|i| start + i)?;
            (anchor, anchor)
        } else {
            (start, end)
        };

        let token = expand_to_identifier(&hit.text, start, end);
        if token.text.is_empty() || token.text == FUNCTION_KEYWORD {
            return None;
        }
        let location = ResolvedLocation::on_hit(root, hit, token.start, token.end)?;
        Some(LocatedSymbol {
            name: token.text,
            location,
        })
    }

    fn query_span(
        &self,
        line: &str,
    ) -> Option<(usize, usize)> {
        if let Some(regex) = &self.regex {
            let caps = regex.captures(line)?;
            let query = caps.get(2)?;
            return Some((query.start(), query.end()));
        }

        // Queries that are not valid regexes are matched literally.
        let lowered_line = line.to_ascii_lowercase();
        let lowered_query = self.query.to_ascii_lowercase();
        let from = lowered_line.find(FUNCTION_KEYWORD).map_or(0, |i| i + FUNCTION_KEYWORD.len());
        let start = lowered_line[from..].find(&lowered_query).map(|i| from + i)?;
        Some((start, start + lowered_query.len()))
    }
}

#[cfg(test)]
#[path = "../../tests/src/definition/locator_tests.rs"]
mod tests;
