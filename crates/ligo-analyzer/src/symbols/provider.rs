use std::{collections::HashSet, path::PathBuf, sync::Arc};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    definition::{FuzzyLocator, ResolvedLocation, fuzzy_function_pattern},
    search::{SearchBackend, SearchMode, search_roots},
};

/// A function declaration found by a workspace-wide fuzzy query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceSymbol {
    pub name: String,
    /// Path of the declaring file relative to its workspace root.
    pub container_name: String,
    pub location: ResolvedLocation,
}

/// Workspace symbol search over function declarations only.
///
/// The query is matched case-insensitively anywhere after the `function`
/// keyword, so partial names find the full identifier.
#[derive(Clone)]
pub struct WorkspaceSymbolProvider {
    backend: Arc<dyn SearchBackend>,
    max_results: usize,
}

impl WorkspaceSymbolProvider {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        max_results: usize,
    ) -> Self {
        Self {
            backend,
            max_results,
        }
    }

    pub async fn provide(
        &self,
        roots: &[PathBuf],
        query: &str,
        cancel: &CancellationToken,
    ) -> Vec<WorkspaceSymbol> {
        if roots.is_empty() {
            return Vec::new();
        }
        let query = query.trim();
        let pattern = fuzzy_function_pattern(query);
        let hits = search_roots(self.backend.as_ref(), roots, &pattern.regex, SearchMode::FUZZY, cancel).await;
        if cancel.is_cancelled() {
            return Vec::new();
        }

        let locator = FuzzyLocator::new(&pattern.highlight);
        let mut seen = HashSet::new();
        let symbols: Vec<WorkspaceSymbol> = hits
            .iter()
            .filter_map(|(root, hit)| {
                let symbol = locator.locate(root, hit)?;
                Some(WorkspaceSymbol {
                    name: symbol.name,
                    container_name: hit.path.to_string_lossy().into_owned(),
                    location: symbol.location,
                })
            })
            .filter(|symbol| seen.insert(symbol.location.clone()))
            .take(self.max_results)
            .collect();

        debug!("[workspace-symbol] '{query}': {} hits, {} symbols", hits.len(), symbols.len());
        symbols
    }
}

#[cfg(test)]
#[path = "../../tests/src/symbols/provider_tests.rs"]
mod tests;
