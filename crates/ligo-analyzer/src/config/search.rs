use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use serde_json::Value;

pub const MIN_MAX_OUTPUT_KB: u64 = 16;
pub const MAX_MAX_OUTPUT_KB: u64 = 1024 * 64;
pub const MIN_MAX_WORKSPACE_SYMBOLS: usize = 1;
pub const MAX_MAX_WORKSPACE_SYMBOLS: usize = 10_000;
pub const DEFAULT_GIT_COMMAND: &str = "git";
pub const DEFAULT_FILE_GLOBS: [&str; 4] = ["*.ligo", "*.mligo", "*.religo", "*.jsligo"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SearchBackendKind {
    /// `git grep --untracked`, falling back to the builtin scan outside a
    /// git work tree.
    #[default]
    GitGrep,
    Builtin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    pub backend: SearchBackendKind,
    pub git_command: String,
    pub file_globs: Vec<String>,
    pub max_output_kb: u64,
    /// Root-relative directories the builtin scan never descends into.
    pub exclude_paths: Vec<String>,
    pub max_workspace_symbols: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            backend: SearchBackendKind::GitGrep,
            git_command: DEFAULT_GIT_COMMAND.to_string(),
            file_globs: default_file_globs(),
            max_output_kb: 1024,
            exclude_paths: Vec::new(),
            max_workspace_symbols: 256,
        }
    }
}

impl SearchSettings {
    pub(crate) fn apply_patch(
        &mut self,
        patch: SearchSettingsPatch,
    ) {
        if let Some(v) = patch.backend {
            self.backend = v;
        }
        if let Some(v) = patch.git_command {
            self.git_command = v;
        }
        if let Some(v) = patch.file_globs {
            self.file_globs = v;
        }
        if let Some(v) = patch.max_output_kb {
            self.max_output_kb = v;
        }
        if let Some(v) = patch.exclude_paths {
            self.exclude_paths = v;
        }
        if let Some(v) = patch.max_workspace_symbols {
            self.max_workspace_symbols = v;
        }
    }

    pub(crate) fn normalize(&mut self) {
        self.git_command = self.git_command.trim().to_string();
        if self.git_command.is_empty() {
            self.git_command = DEFAULT_GIT_COMMAND.to_string();
        }

        self.file_globs = trimmed_unique(&self.file_globs);
        if self.file_globs.is_empty() {
            self.file_globs = default_file_globs();
        }

        self.exclude_paths = trimmed_unique(&self.exclude_paths);
        self.max_output_kb = self.max_output_kb.clamp(MIN_MAX_OUTPUT_KB, MAX_MAX_OUTPUT_KB);
        self.max_workspace_symbols =
            self.max_workspace_symbols.clamp(MIN_MAX_WORKSPACE_SYMBOLS, MAX_MAX_WORKSPACE_SYMBOLS);
    }

    pub fn max_output_bytes(&self) -> usize {
        self.max_output_kb.saturating_mul(1024) as usize
    }
}

fn default_file_globs() -> Vec<String> {
    DEFAULT_FILE_GLOBS.iter().map(|glob| glob.to_string()).collect()
}

fn trimmed_unique(values: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct SearchSettingsPatch {
    pub(crate) backend: Option<SearchBackendKind>,
    pub(crate) git_command: Option<String>,
    pub(crate) file_globs: Option<Vec<String>>,
    pub(crate) max_output_kb: Option<u64>,
    pub(crate) exclude_paths: Option<Vec<String>>,
    pub(crate) max_workspace_symbols: Option<usize>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, Value>,
}
