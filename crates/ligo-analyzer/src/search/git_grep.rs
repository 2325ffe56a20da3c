use std::process::Stdio;

use tokio::{
    io::{AsyncRead, AsyncReadExt},
    process::{Child, Command},
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::search::{LineMatcher, RawHit, SearchBackend, SearchError, SearchRequest, output::parse_output};

const STDERR_CAP_BYTES: u64 = 64 * 1024;
const NOT_A_REPOSITORY: &str = "not a git repository";

/// Runs `git grep` in the search root.
///
/// Untracked files are searched too, binary files are skipped and paths
/// come back relative to the root. `-w` is never passed: git treats any
/// non-word character as a boundary, so whole-word requests are filtered
/// afterwards with the same [`LineMatcher`] the builtin scan uses.
#[derive(Debug, Clone)]
pub struct GitGrepBackend {
    command: String,
    file_globs: Vec<String>,
    max_output_bytes: usize,
}

impl GitGrepBackend {
    pub fn new(
        command: impl Into<String>,
        file_globs: Vec<String>,
        max_output_bytes: usize,
    ) -> Self {
        Self {
            command: command.into(),
            file_globs,
            max_output_bytes,
        }
    }

    pub(crate) fn args(
        &self,
        request: &SearchRequest<'_>,
    ) -> Vec<String> {
        let mut args: Vec<String> =
            ["-c", "core.quotepath=off", "grep", "-n", "-I", "-E", "--untracked", "--no-color"]
                .iter()
                .map(|arg| arg.to_string())
                .collect();
        if request.case_insensitive {
            args.push("-i".to_string());
        }
        args.push("-e".to_string());
        args.push(request.pattern.to_string());
        args.push("--".to_string());
        args.extend(self.file_globs.iter().cloned());
        args
    }

    async fn collect(
        &self,
        child: &mut Child,
        request: &SearchRequest<'_>,
    ) -> Result<Vec<RawHit>, SearchError> {
        let stdout = read_capped(child.stdout.take(), self.max_output_bytes as u64 + 1)
            .await
            .map_err(|error| self.launch_failed(format!("failed to read output: {error}")))?;
        if stdout.len() > self.max_output_bytes {
            let _ = child.start_kill();
            return Err(SearchError::OutputTooLarge {
                limit_bytes: self.max_output_bytes,
            });
        }

        let stderr = read_capped(child.stderr.take(), STDERR_CAP_BYTES).await.unwrap_or_default();
        let status = child.wait().await.map_err(|error| self.launch_failed(error.to_string()))?;

        match status.code() {
            Some(0) => Ok(parse_output(&String::from_utf8_lossy(&stdout))),
            // git grep exits with 1 when nothing matched.
            Some(1) if stdout.is_empty() => Ok(Vec::new()),
            _ => {
                let reason = String::from_utf8_lossy(&stderr).trim().to_string();
                if reason.contains(NOT_A_REPOSITORY) {
                    return Err(SearchError::NotARepository(request.root.to_path_buf()));
                }
                Err(SearchError::SearchFailed {
                    command: self.command.clone(),
                    reason: if reason.is_empty() {
                        format!("process exited with status {status}")
                    } else {
                        reason
                    },
                })
            },
        }
    }

    fn launch_failed(
        &self,
        reason: String,
    ) -> SearchError {
        SearchError::LaunchFailed {
            command: self.command.clone(),
            reason,
        }
    }
}

#[tower_lsp::async_trait]
impl SearchBackend for GitGrepBackend {
    fn name(&self) -> &'static str {
        "git grep"
    }

    async fn search(
        &self,
        request: SearchRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<Vec<RawHit>, SearchError> {
        if !request.root.is_dir() {
            return Err(SearchError::InvalidRoot(request.root.to_path_buf()));
        }

        let word_filter = if request.whole_word {
            Some(LineMatcher::new(&request)?)
        } else {
            None
        };
        let args = self.args(&request);
        debug!("[search] {} {} (in {})", self.command, args.join(" "), request.root.display());

        let mut child = Command::new(&self.command)
            .args(&args)
            .current_dir(request.root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|error| match error.kind() {
                std::io::ErrorKind::NotFound => SearchError::CommandNotFound(self.command.clone()),
                _ => self.launch_failed(error.to_string()),
            })?;

        // Returning early drops `child`, which kills the process.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SearchError::Cancelled),
            result = self.collect(&mut child, &request) => {
                let mut hits = result?;
                if let Some(matcher) = word_filter {
                    hits.retain(|hit| matcher.is_match(&hit.text));
                }
                Ok(hits)
            },
        }
    }
}

async fn read_capped<R: AsyncRead + Unpin>(
    reader: Option<R>,
    cap: u64,
) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(reader) = reader {
        reader.take(cap).read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/src/search/git_grep_tests.rs"]
mod tests;
