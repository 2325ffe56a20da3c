//! Server configuration.
//!
//! Settings are split into one file per category. [`ServerSettings`]
//! aggregates them and handles JSON deserialization from LSP
//! initialization options and `didChangeConfiguration` payloads, either
//! bare or namespaced under [`SETTINGS_SECTION_KEY`].

pub(crate) mod logging;
pub(crate) mod search;

use std::collections::HashMap;

use logging::LoggingSettingsPatch;
pub use logging::{LogLevel, LoggingSettings};
use search::SearchSettingsPatch;
pub use search::{
    DEFAULT_FILE_GLOBS, DEFAULT_GIT_COMMAND, MAX_MAX_OUTPUT_KB, MAX_MAX_WORKSPACE_SYMBOLS, MIN_MAX_OUTPUT_KB,
    MIN_MAX_WORKSPACE_SYMBOLS, SearchBackendKind, SearchSettings,
};
use serde::Deserialize;
use serde_json::Value;

pub const SETTINGS_SECTION_KEY: &str = "ligo-analyzer";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ServerSettings {
    pub search: SearchSettings,
    pub logging: LoggingSettings,
}

impl ServerSettings {
    pub fn from_lsp_payload(payload: Option<&Value>) -> Self {
        let mut settings = Self::default();
        if let Some(payload) = payload {
            settings = settings.merged_with_payload(payload);
        }
        settings
    }

    pub fn merged_with_payload(
        &self,
        payload: &Value,
    ) -> Self {
        let mut merged = self.clone();

        for candidate in payload_candidates(payload) {
            if let Ok(patch) = serde_json::from_value::<ServerSettingsPatch>(candidate.clone()) {
                merged.apply_patch(patch);
            }
        }

        merged.normalize();
        merged
    }

    fn apply_patch(
        &mut self,
        patch: ServerSettingsPatch,
    ) {
        if let Some(p) = patch.search {
            self.search.apply_patch(p);
        }
        if let Some(p) = patch.logging {
            self.logging.apply_patch(p);
        }
    }

    fn normalize(&mut self) {
        self.search.normalize();
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct ServerSettingsPatch {
    search: Option<SearchSettingsPatch>,
    logging: Option<LoggingSettingsPatch>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

fn payload_candidates(payload: &Value) -> Vec<&Value> {
    let mut candidates = vec![payload];
    if let Some(scoped) = payload.get(SETTINGS_SECTION_KEY) {
        candidates.push(scoped);
    }
    candidates
}

#[cfg(test)]
#[path = "../../tests/src/config/settings_tests.rs"]
mod tests;
