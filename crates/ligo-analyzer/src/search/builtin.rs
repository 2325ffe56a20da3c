use std::path::{Path, PathBuf};

use glob::Pattern;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::search::{LineMatcher, RawHit, SearchBackend, SearchError, SearchRequest, output::rendered_len};

/// `search.fileGlobs` compiled once, matched the way git pathspecs are:
/// a glob without `/` against the file name, any other against the
/// root-relative path. `*` crosses directory separators in both cases.
#[derive(Debug, Clone)]
pub struct FileGlobs {
    patterns: Vec<(Pattern, bool)>,
}

impl FileGlobs {
    pub fn new(globs: &[String]) -> Self {
        let patterns = globs
            .iter()
            .filter_map(|glob| match Pattern::new(glob) {
                Ok(pattern) => Some((pattern, glob.contains('/'))),
                Err(error) => {
                    warn!("[search] ignoring file glob '{glob}': {error}");
                    None
                },
            })
            .collect();
        Self {
            patterns,
        }
    }

    /// `relative` is the file's path below the search root.
    pub fn matches(
        &self,
        relative: &Path,
    ) -> bool {
        let Some(file_name) = relative.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        let slash_path = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        self.patterns.iter().any(|(pattern, against_path)| {
            if *against_path { pattern.matches(&slash_path) } else { pattern.matches(file_name) }
        })
    }
}

/// In-process linear scan of the root with `walkdir` and `regex`.
///
/// Used when git is unavailable or the root is not a work tree.
#[derive(Debug, Clone)]
pub struct BuiltinBackend {
    file_globs: FileGlobs,
    exclude_paths: Vec<String>,
    max_output_bytes: usize,
}

impl BuiltinBackend {
    pub fn new(
        file_globs: Vec<String>,
        exclude_paths: Vec<String>,
        max_output_bytes: usize,
    ) -> Self {
        Self {
            file_globs: FileGlobs::new(&file_globs),
            exclude_paths,
            max_output_bytes,
        }
    }

    fn scan(
        &self,
        root: &Path,
        matcher: &LineMatcher,
        cancel: &CancellationToken,
    ) -> Result<Vec<RawHit>, SearchError> {
        let mut hits = Vec::new();
        let mut output_bytes = 0usize;

        let walker = WalkDir::new(root).into_iter().filter_entry(|entry| !self.is_skipped_dir(root, entry));
        for entry in walker {
            if cancel.is_cancelled() {
                return Err(SearchError::Cancelled);
            }
            let Ok(entry) = entry else {
                continue;
            };
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path()).to_path_buf();
            if !entry.file_type().is_file() || !self.file_globs.matches(&relative) {
                continue;
            }

            let bytes = match std::fs::read(entry.path()) {
                Ok(bytes) => bytes,
                Err(error) => {
                    debug!("[search] skipping {}: {error}", entry.path().display());
                    continue;
                },
            };
            if bytes.contains(&0) {
                continue;
            }

            let text = String::from_utf8_lossy(&bytes);
            for (index, line) in text.lines().enumerate() {
                if !matcher.is_match(line) {
                    continue;
                }
                let hit = RawHit {
                    path: relative.clone(),
                    line: index as u32 + 1,
                    text: line.to_string(),
                };
                output_bytes += rendered_len(&hit) + 1;
                if output_bytes > self.max_output_bytes {
                    return Err(SearchError::OutputTooLarge {
                        limit_bytes: self.max_output_bytes,
                    });
                }
                hits.push(hit);
            }
        }

        Ok(hits)
    }

    fn is_skipped_dir(
        &self,
        root: &Path,
        entry: &DirEntry,
    ) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }
        let name = entry.file_name().to_str().unwrap_or("");
        if should_exclude_dir(name) {
            return true;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        self.exclude_paths.iter().any(|excluded| relative.starts_with(excluded))
    }
}

#[tower_lsp::async_trait]
impl SearchBackend for BuiltinBackend {
    fn name(&self) -> &'static str {
        "builtin"
    }

    async fn search(
        &self,
        request: SearchRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<Vec<RawHit>, SearchError> {
        if !request.root.is_dir() {
            return Err(SearchError::InvalidRoot(request.root.to_path_buf()));
        }
        let matcher = LineMatcher::new(&request)?;

        let backend = self.clone();
        let root: PathBuf = request.root.to_path_buf();
        let scan_cancel = cancel.clone();
        let scan = tokio::task::spawn_blocking(move || backend.scan(&root, &matcher, &scan_cancel));

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SearchError::Cancelled),
            joined = scan => joined.map_err(|error| SearchError::SearchFailed {
                command: self.name().to_string(),
                reason: error.to_string(),
            })?,
        }
    }
}

/// Directories that never hold sources worth navigating to.
fn should_exclude_dir(name: &str) -> bool {
    if name.starts_with('.') {
        return true;
    }
    matches!(name, "target" | "node_modules" | "_build" | "_esy" | "build" | "out")
}

#[cfg(test)]
#[path = "../../tests/src/search/builtin_tests.rs"]
mod tests;
