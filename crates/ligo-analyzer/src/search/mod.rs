//! Repository-wide text search.
//!
//! The definition and symbol providers hand a regex to a [`SearchBackend`]
//! together with a root directory and receive matching lines back. The
//! backend decides how the tree is scanned.

mod builtin;
mod configured;
mod error;
mod git_grep;
mod matcher;
mod output;

use std::path::{Path, PathBuf};

pub use builtin::{BuiltinBackend, FileGlobs};
pub use configured::ConfiguredSearch;
pub use error::SearchError;
pub use git_grep::GitGrepBackend;
use futures::future::join_all;
pub use matcher::{LineMatcher, has_word_edges};
pub use output::parse_output;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// One matching line. `path` is relative to the searched root and `line` is
/// 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHit {
    pub path: PathBuf,
    pub line: u32,
    pub text: String,
}

#[derive(Debug, Clone, Copy)]
pub struct SearchRequest<'a> {
    pub root: &'a Path,
    /// Extended regular expression, matched anywhere in a line.
    pub pattern: &'a str,
    pub case_insensitive: bool,
    /// Reject matches whose edges cut through an identifier.
    pub whole_word: bool,
}

impl<'a> SearchRequest<'a> {
    pub fn new(
        root: &'a Path,
        pattern: &'a str,
    ) -> Self {
        Self {
            root,
            pattern,
            case_insensitive: false,
            whole_word: false,
        }
    }

    pub fn ignoring_case(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    pub fn whole_words(mut self) -> Self {
        self.whole_word = true;
        self
    }

    fn with_mode(
        self,
        mode: SearchMode,
    ) -> Self {
        Self {
            case_insensitive: mode.case_insensitive,
            whole_word: mode.whole_word,
            ..self
        }
    }
}

/// How a pattern is matched, shared by every root of one lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchMode {
    pub case_insensitive: bool,
    pub whole_word: bool,
}

impl SearchMode {
    /// Declaration sites: exact case, whole identifiers.
    pub const DEFINITION: Self = Self {
        case_insensitive: false,
        whole_word: true,
    };
    /// Partial, case-insensitive names inside a declaration line.
    pub const FUZZY: Self = Self {
        case_insensitive: true,
        whole_word: false,
    };
}

#[tower_lsp::async_trait]
pub trait SearchBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Run `request` to completion. "No matches" is an empty list, not an
    /// error. Implementations return [`SearchError::Cancelled`] promptly once
    /// `cancel` fires.
    async fn search(
        &self,
        request: SearchRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<Vec<RawHit>, SearchError>;
}

/// Search every root concurrently and pair each hit with its root.
///
/// Failures are logged and contribute no hits, so a broken root never hides
/// the results of the others.
pub async fn search_roots<'r>(
    backend: &dyn SearchBackend,
    roots: &'r [PathBuf],
    pattern: &str,
    mode: SearchMode,
    cancel: &CancellationToken,
) -> Vec<(&'r Path, RawHit)> {
    let searches = roots.iter().map(|root| async move {
        let request = SearchRequest::new(root, pattern).with_mode(mode);
        match backend.search(request, cancel).await {
            Ok(hits) => hits.into_iter().map(|hit| (root.as_path(), hit)).collect(),
            Err(SearchError::Cancelled) => {
                debug!("[search] cancelled '{pattern}' in {}", root.display());
                Vec::new()
            },
            Err(err @ SearchError::OutputTooLarge { .. }) => {
                error!("[search] '{pattern}' in {}: {err}; dropping results", root.display());
                Vec::new()
            },
            Err(err) => {
                warn!("[search] {} failed for '{pattern}' in {}: {err}", backend.name(), root.display());
                Vec::new()
            },
        }
    });

    join_all(searches).await.into_iter().flatten().collect()
}

#[cfg(test)]
#[path = "../../tests/src/search/mod_tests.rs"]
mod tests;
