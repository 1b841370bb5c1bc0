//! Index item construction.
//!
//! Items are a pure function of the directory path, so the same directory
//! always produces the same id. The incremental index depends on that.

use std::io;
use std::path::{Path, PathBuf};

use waypoint_types::{
    Action, EntryPoint, IndexItem, MetadataItem, PreviewData, PreviewKind, SelectedItem, Step,
};

use crate::source::DirectoryEntry;
use crate::{Error, Result};

pub const ID_PREFIX: &str = "zoxide:";

pub const ACTION_FILES: &str = "files";
pub const ACTION_COPY: &str = "copy";

const ICON: &str = "folder_special";
const EMPTY_DIRECTORY: &str = "(empty directory)";
const PERMISSION_DENIED: &str = "(permission denied)";
const MORE_MARKER: &str = "...";

#[must_use]
pub fn item_id(path: &str) -> String {
    format!("{ID_PREFIX}{path}")
}

/// Recover the raw path from an item id.
///
/// # Errors
///
/// `InvalidItem` when the id does not carry this plugin's prefix, `MissingPath`
/// when nothing follows it.
pub fn path_from_id(id: &str) -> Result<&str> {
    let path = id.strip_prefix(ID_PREFIX).ok_or(Error::InvalidItem)?;
    if path.is_empty() {
        return Err(Error::MissingPath);
    }
    Ok(path)
}

/// Last path segment, or the whole path when there is none (`/`)
#[must_use]
pub fn display_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map_or_else(|| path.to_string(), |n| n.to_string_lossy().into_owned())
}

/// Shorten paths under `home` to `~/...`
#[must_use]
pub fn display_path(path: &str, home: &Path) -> String {
    if home.as_os_str().is_empty() || home.parent().is_none() {
        return path.to_string();
    }

    match Path::new(path).strip_prefix(home) {
        Ok(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Ok(rest) => format!("~/{}", rest.display()),
        Err(_) => path.to_string(),
    }
}

#[must_use]
pub fn keywords(path: &str) -> Vec<String> {
    path.to_lowercase()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Listing of the first `limit` children, directories marked with a trailing `/`.
///
/// Empty when the path is gone or not a directory.
#[must_use]
pub fn preview_content(path: &Path, limit: usize) -> String {
    if !path.is_dir() {
        return String::new();
    }

    match list_children(path) {
        Ok(children) if children.is_empty() => EMPTY_DIRECTORY.to_string(),
        Ok(children) => {
            let mut lines: Vec<String> = children
                .iter()
                .take(limit)
                .map(|(name, is_dir)| {
                    if *is_dir {
                        format!("{name}/")
                    } else {
                        name.clone()
                    }
                })
                .collect();
            if children.len() > limit {
                lines.push(MORE_MARKER.to_string());
            }
            lines.join("\n")
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(_) => PERMISSION_DENIED.to_string(),
    }
}

/// Children that cannot be read individually are left out of the listing.
fn list_children(path: &Path) -> io::Result<Vec<(String, bool)>> {
    let mut children: Vec<(String, bool)> = std::fs::read_dir(path)?
        .filter_map(std::result::Result::ok)
        .map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            (name, entry.path().is_dir())
        })
        .collect();
    children.sort();
    Ok(children)
}

/// Builds launcher items from ranked directories
#[derive(Debug, Clone)]
pub struct ItemBuilder {
    home: PathBuf,
    preview_limit: usize,
}

impl ItemBuilder {
    #[must_use]
    pub fn new(home: PathBuf, preview_limit: usize) -> Self {
        Self {
            home,
            preview_limit,
        }
    }

    #[must_use]
    pub fn build(&self, entry: &DirectoryEntry) -> IndexItem {
        let path = entry.path.as_str();
        let id = item_id(path);
        let name = display_name(path);
        let description = display_path(path, &self.home);

        IndexItem {
            name: name.clone(),
            description: Some(description.clone()),
            icon: Some(ICON.to_string()),
            verb: Some("Open".to_string()),
            keywords: keywords(path),
            entry_point: Some(EntryPoint {
                step: Step::Action,
                selected: SelectedItem::new(id.clone()),
            }),
            preview: Some(PreviewData {
                kind: PreviewKind::Text,
                title: Some(name),
                content: Some(preview_content(Path::new(path), self.preview_limit)),
                metadata: vec![MetadataItem {
                    label: "Path".to_string(),
                    value: description,
                    icon: None,
                }],
            }),
            actions: vec![
                Action::new(ACTION_FILES, "Open in Files", "folder_open"),
                Action::new(ACTION_COPY, "Copy Path", "content_copy"),
            ],
            id,
        }
    }

    #[must_use]
    pub fn build_all(&self, entries: &[DirectoryEntry]) -> Vec<IndexItem> {
        entries.iter().map(|entry| self.build(entry)).collect()
    }
}
