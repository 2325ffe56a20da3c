use std::{
    collections::HashSet,
    path::PathBuf,
    sync::Arc,
};

use tokio_util::sync::CancellationToken;
use tower_lsp::lsp_types::Position;
use tracing::debug;

use crate::{
    definition::{
        boundary::{Token, identifier_at},
        context::{LexicalContext, UsageShape, classify},
        locator::{ResolvedLocation, locate},
        pattern::{SearchPattern, definition_pattern},
    },
    search::{SearchBackend, SearchMode, search_roots},
    text_pos::byte_offset_of_utf16_column,
};

/// Everything derived from the cursor before searching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub token: Token,
    pub shape: UsageShape,
    pub pattern: SearchPattern,
}

/// Classify the identifier under `character` on `line_text` and build the
/// pattern for its definition site.
///
/// Returns `None` when the cursor is not on or right after an identifier.
pub fn analyze(
    line_text: &str,
    character: u32,
) -> Option<Lookup> {
    let offset = byte_offset_of_utf16_column(line_text, character);
    let token = identifier_at(line_text, offset)?;
    let context = LexicalContext::around(line_text, &token);
    let shape = classify(&token.text, &context);
    let pattern = definition_pattern(shape, &token.text);
    Some(Lookup {
        token,
        shape,
        pattern,
    })
}

/// Go-to-definition (and declaration) by searching the workspace for the
/// textual shape of a declaration.
#[derive(Clone)]
pub struct DefinitionProvider {
    backend: Arc<dyn SearchBackend>,
}

impl DefinitionProvider {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
        }
    }

    /// Candidate definition sites for the identifier at `position`.
    ///
    /// `line_text` is the text of `position.line`. Without workspace roots
    /// nothing is searched.
    pub async fn provide(
        &self,
        roots: &[PathBuf],
        line_text: &str,
        position: Position,
        cancel: &CancellationToken,
    ) -> Vec<ResolvedLocation> {
        if roots.is_empty() {
            return Vec::new();
        }
        let Some(lookup) = analyze(line_text, position.character) else {
            debug!("[goto-def] no identifier at {}:{}", position.line + 1, position.character + 1);
            return Vec::new();
        };
        debug!("[goto-def] '{}' is a {} → /{}/", lookup.token.text, lookup.shape, lookup.pattern.regex);

        let hits =
            search_roots(self.backend.as_ref(), roots, &lookup.pattern.regex, SearchMode::DEFINITION, cancel).await;
        if cancel.is_cancelled() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let locations: Vec<ResolvedLocation> = hits
            .iter()
            .filter_map(|(root, hit)| locate(root, hit, &lookup.pattern.highlight))
            .filter(|location| seen.insert(location.clone()))
            .collect();
        debug!("[goto-def] '{}': {} hits, {} locations", lookup.token.text, hits.len(), locations.len());
        locations
    }
}

#[cfg(test)]
#[path = "../../tests/src/definition/provider_tests.rs"]
mod tests;
