//! Pattern-based definition lookup.
//!
//! The identifier under the cursor is classified from its neighbouring
//! characters, turned into a regex describing its declaration, searched
//! across the workspace, and each matching line is mapped back to a span.

mod boundary;
mod context;
mod locator;
mod pattern;
mod provider;

pub use boundary::{Token, expand_to_identifier, identifier_at, is_identifier_char, last_index_of_regex};
pub use context::{LexicalContext, UsageShape, classify};
pub use locator::{FuzzyLocator, LocatedSymbol, ResolvedLocation, locate};
pub use pattern::{SearchPattern, definition_pattern, fuzzy_function_pattern};
pub use provider::{DefinitionProvider, Lookup, analyze};
