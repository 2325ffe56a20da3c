use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    config::{SearchBackendKind, SearchSettings},
    search::{BuiltinBackend, GitGrepBackend, RawHit, SearchBackend, SearchError, SearchRequest},
};

/// The backend selected by [`SearchSettings`].
///
/// With the git backend preferred, a missing git binary or a root outside
/// any work tree falls back to the builtin scan for that request.
#[derive(Debug, Clone)]
pub struct ConfiguredSearch {
    preferred: SearchBackendKind,
    git: GitGrepBackend,
    builtin: BuiltinBackend,
}

impl ConfiguredSearch {
    pub fn from_settings(settings: &SearchSettings) -> Self {
        let max_output_bytes = settings.max_output_bytes();
        Self {
            preferred: settings.backend,
            git: GitGrepBackend::new(settings.git_command.clone(), settings.file_globs.clone(), max_output_bytes),
            builtin: BuiltinBackend::new(
                settings.file_globs.clone(),
                settings.exclude_paths.clone(),
                max_output_bytes,
            ),
        }
    }
}

#[tower_lsp::async_trait]
impl SearchBackend for ConfiguredSearch {
    fn name(&self) -> &'static str {
        match self.preferred {
            SearchBackendKind::GitGrep => self.git.name(),
            SearchBackendKind::Builtin => self.builtin.name(),
        }
    }

    async fn search(
        &self,
        request: SearchRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<Vec<RawHit>, SearchError> {
        if self.preferred == SearchBackendKind::Builtin {
            return self.builtin.search(request, cancel).await;
        }

        match self.git.search(request, cancel).await {
            Err(error) if error.allows_fallback() => {
                match &error {
                    SearchError::CommandNotFound(_) => info!("[search] {error}; using builtin scan"),
                    _ => debug!("[search] {error}; using builtin scan"),
                }
                self.builtin.search(request, cancel).await
            },
            result => result,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src/search/configured_tests.rs"]
mod tests;
