//! zoxide query adapter.
//!
//! Turns `zoxide query -l -s` output into a ranked snapshot. Every failure mode
//! (tool missing, non-zero exit, timeout, garbage lines) degrades to fewer or
//! zero entries; nothing here returns an error to the caller.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, warn};

use crate::Error;
use crate::config::Settings;
use crate::process;

/// One ranked directory from the database
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryEntry {
    pub path: String,
    pub score: f64,
}

/// Parse one `<score> <path>` line. The path keeps any inner whitespace.
#[must_use]
pub fn parse_line(line: &str) -> Option<DirectoryEntry> {
    let (score, path) = line.trim_start().split_once(char::is_whitespace)?;
    let path = path.trim_start();
    if path.is_empty() {
        return None;
    }

    let score: f64 = score.parse().ok()?;
    if !score.is_finite() {
        return None;
    }

    Some(DirectoryEntry {
        path: path.to_string(),
        score,
    })
}

/// Build a snapshot from raw query output.
///
/// Keeps only existing directories, orders by score (highest first, ties in
/// output order), drops repeated paths and caps the result at `max_items`.
#[must_use]
pub fn parse_output(stdout: &str, max_items: usize) -> Vec<DirectoryEntry> {
    let mut entries: Vec<DirectoryEntry> = stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let entry = parse_line(line);
            if entry.is_none() {
                debug!("Skipping malformed zoxide line: {line:?}");
            }
            entry
        })
        .filter(|entry| Path::new(&entry.path).is_dir())
        .collect();

    entries.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut seen = HashSet::new();
    entries.retain(|entry| seen.insert(entry.path.clone()));
    entries.truncate(max_items);
    entries
}

/// Runs the ranking query configured in [`Settings`]
#[derive(Debug, Clone)]
pub struct ZoxideSource {
    command: Vec<String>,
    timeout: Duration,
    max_items: usize,
}

impl ZoxideSource {
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self {
            command: settings.query_command.clone(),
            timeout: settings.query_timeout(),
            max_items: settings.max_items(),
        }
    }

    /// Query the ranking tool for a fresh snapshot. Empty on any failure.
    pub async fn query(&self) -> Vec<DirectoryEntry> {
        let output = match process::output_with_timeout(&self.command, self.timeout).await {
            Ok(output) => output,
            Err(Error::Spawn { program, source })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                debug!("{program} not installed, index is empty");
                return Vec::new();
            }
            Err(e) => {
                warn!("zoxide query failed: {e}");
                return Vec::new();
            }
        };

        if !output.status.success() {
            warn!("zoxide query exited with {}", output.status);
            return Vec::new();
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let entries = parse_output(&stdout, self.max_items);
        debug!("zoxide returned {} directories", entries.len());
        entries
    }
}
