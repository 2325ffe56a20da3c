use std::fmt;

use crate::definition::boundary::Token;

/// Marker that turns a quoted name into a view-function reference.
const CALL_VIEW_MARKER: &str = "call_view";

/// The characters right around a token plus its whole line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexicalContext<'a> {
    pub prev: Option<char>,
    pub next: Option<char>,
    pub line: &'a str,
}

impl<'a> LexicalContext<'a> {
    pub fn around(
        line: &'a str,
        token: &Token,
    ) -> Self {
        Self {
            prev: line[..token.start].chars().next_back(),
            next: line[token.end..].chars().next(),
            line,
        }
    }
}

/// Syntactic role of an identifier at its use site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsageShape {
    /// `Some(x)`: a variant constructor applied to arguments.
    ConstructorCall,
    /// `foo(x)` or `Module%foo`.
    FunctionCall,
    /// `record.field`.
    FieldAccess,
    /// `"name"` on a line that invokes `call_view`.
    ViewReference,
    TypeReference,
}

impl fmt::Display for UsageShape {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            Self::ConstructorCall => "constructor call",
            Self::FunctionCall => "function call",
            Self::FieldAccess => "field access",
            Self::ViewReference => "view reference",
            Self::TypeReference => "type reference",
        };
        f.write_str(name)
    }
}

/// Decide the usage shape of `word` from its neighbours.
///
/// Rules are checked in order and the first hit wins; anything unmatched is
/// a type reference. Only an ASCII uppercase first letter marks a
/// constructor.
pub fn classify(
    word: &str,
    context: &LexicalContext<'_>,
) -> UsageShape {
    let starts_uppercase = word.chars().next().is_some_and(|c| c.is_ascii_uppercase());

    match (context.prev, context.next) {
        (_, Some('(')) if starts_uppercase => UsageShape::ConstructorCall,
        (_, Some('(')) => UsageShape::FunctionCall,
        (Some('.'), _) => UsageShape::FieldAccess,
        (Some('%'), _) => UsageShape::FunctionCall,
        (Some('"'), Some('"')) if context.line.contains(CALL_VIEW_MARKER) => UsageShape::ViewReference,
        _ => UsageShape::TypeReference,
    }
}

#[cfg(test)]
#[path = "../../tests/src/definition/context_tests.rs"]
mod tests;
