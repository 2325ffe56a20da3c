use regex::{Regex, RegexBuilder};

use crate::{
    definition::is_identifier_char,
    search::{SearchError, SearchRequest},
};

/// Decides whether a line is a hit for a request. Every backend filters its
/// candidate lines through this so they agree on boundaries.
#[derive(Debug, Clone)]
pub struct LineMatcher {
    regex: Regex,
    whole_word: bool,
}

impl LineMatcher {
    pub fn new(request: &SearchRequest<'_>) -> Result<Self, SearchError> {
        let regex = RegexBuilder::new(request.pattern).case_insensitive(request.case_insensitive).build().map_err(
            |error| SearchError::InvalidPattern {
                pattern: request.pattern.to_string(),
                reason: error.to_string(),
            },
        )?;
        Ok(Self {
            regex,
            whole_word: request.whole_word,
        })
    }

    pub fn is_match(
        &self,
        line: &str,
    ) -> bool {
        if !self.whole_word {
            return self.regex.is_match(line);
        }

        let mut from = 0;
        while let Some(found) = self.regex.find_at(line, from) {
            if has_word_edges(line, found.start(), found.end()) {
                return true;
            }
            // A rejected match may hide an accepted one starting inside it.
            match line[found.start()..].chars().next() {
                Some(c) => from = found.start() + c.len_utf8(),
                None => break,
            }
        }
        false
    }
}

/// `line[start..end]` does not cut an identifier: when the match begins or
/// ends on an identifier character, the character beyond that edge is not
/// one.
pub fn has_word_edges(
    line: &str,
    start: usize,
    end: usize,
) -> bool {
    let matched = &line[start..end];
    let opens_cleanly = match (matched.chars().next(), line[..start].chars().next_back()) {
        (Some(first), Some(before)) => !(is_identifier_char(first) && is_identifier_char(before)),
        _ => true,
    };
    let closes_cleanly = match (matched.chars().next_back(), line[end..].chars().next()) {
        (Some(last), Some(after)) => !(is_identifier_char(last) && is_identifier_char(after)),
        _ => true,
    };
    opens_cleanly && closes_cleanly
}

#[cfg(test)]
#[path = "../../tests/src/search/matcher_tests.rs"]
mod tests;
