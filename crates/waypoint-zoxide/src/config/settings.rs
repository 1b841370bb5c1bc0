use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::Result;

/// Hard cap on snapshot size; the launcher index is not meant to mirror the whole database.
pub const MAX_ITEMS: usize = 50;

const DEFAULT_TERMINAL: &str = "ghostty";

const KNOWN_KEYS: &[&str] = &[
    "maxItems",
    "pollIntervalSecs",
    "queryTimeoutSecs",
    "clipboardTimeoutSecs",
    "previewLimit",
    "queryCommand",
    "database",
    "terminal",
    "fileOpener",
    "clipboardCommand",
    "watch",
];

/// Plugin configuration (zoxide.json)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub max_items: usize,

    /// Fallback reindex interval when no request or file event arrives
    pub poll_interval_secs: u64,

    pub query_timeout_secs: u64,

    pub clipboard_timeout_secs: u64,

    /// Number of children listed in a directory preview
    pub preview_limit: usize,

    /// Ranking query; must print `<score> <path>` lines
    pub query_command: Vec<String>,

    /// Override for the watched zoxide database
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    /// Terminal program; `$TERMINAL` is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal: Option<String>,

    pub file_opener: Vec<String>,

    pub clipboard_command: Vec<String>,

    /// Wake up on filesystem events instead of waiting for the next poll
    pub watch: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_items: MAX_ITEMS,
            poll_interval_secs: 60,
            query_timeout_secs: 5,
            clipboard_timeout_secs: 5,
            preview_limit: 20,
            query_command: ["zoxide", "query", "-l", "-s"]
                .into_iter()
                .map(String::from)
                .collect(),
            database: None,
            terminal: None,
            file_opener: vec!["xdg-open".to_string()],
            clipboard_command: vec!["wl-copy".to_string()],
            watch: true,
        }
    }
}

impl Settings {
    /// Load settings from file, falling back to defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        warn_unknown_fields(&content, path);
        let settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Snapshot cap, always within `1..=MAX_ITEMS`
    #[must_use]
    pub fn max_items(&self) -> usize {
        self.max_items.clamp(1, MAX_ITEMS)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    #[must_use]
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs.max(1))
    }

    #[must_use]
    pub fn clipboard_timeout(&self) -> Duration {
        Duration::from_secs(self.clipboard_timeout_secs.max(1))
    }

    #[must_use]
    pub fn terminal_program(&self) -> String {
        resolve_terminal(self.terminal.as_deref(), std::env::var("TERMINAL").ok())
    }
}

fn resolve_terminal(configured: Option<&str>, env: Option<String>) -> String {
    configured
        .map(str::to_string)
        .or(env)
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TERMINAL.to_string())
}

fn warn_unknown_fields(content: &str, path: &Path) {
    let Ok(serde_json::Value::Object(obj)) = serde_json::from_str(content) else {
        return;
    };

    for key in obj.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            warn!("Unknown config field in {}: {key}", path.display());
        }
    }
}
