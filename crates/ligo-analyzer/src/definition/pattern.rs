use crate::definition::context::UsageShape;

/// Extended-regex search pattern for a definition site, plus the text to
/// highlight on a matching line.
///
/// Token text is spliced in verbatim; identifiers never contain regex
/// metacharacters, but fuzzy queries typed by the user may.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPattern {
    pub regex: String,
    pub highlight: String,
}

impl SearchPattern {
    fn new(
        regex: String,
        highlight: &str,
    ) -> Self {
        Self {
            regex,
            highlight: highlight.to_string(),
        }
    }
}

/// Pattern matching the declaration a use of `word` with `shape` refers to.
pub fn definition_pattern(
    shape: UsageShape,
    word: &str,
) -> SearchPattern {
    let regex = match shape {
        // `| Some of int` in a variant declaration.
        UsageShape::ConstructorCall => format!(r"[|]\s+{word}"),
        UsageShape::FunctionCall => function_declaration(word),
        // ` owner : address;` inside a record type.
        UsageShape::FieldAccess => format!(r" {word}\s+: "),
        UsageShape::ViewReference => format!(r"\[@view\]\s+{}", function_declaration(word)),
        UsageShape::TypeReference => format!(r"type\s+{word} "),
    };
    SearchPattern::new(regex, word)
}

/// Pattern matching any function declaration whose line contains `query`
/// somewhere after the `function` keyword.
pub fn fuzzy_function_pattern(query: &str) -> SearchPattern {
    SearchPattern::new(format!("function(.*?){query}"), query)
}

fn function_declaration(word: &str) -> String {
    format!(r"function\s+{word}\s*[(]")
}

#[cfg(test)]
#[path = "../../tests/src/definition/pattern_tests.rs"]
mod tests;
