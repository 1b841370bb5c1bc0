//! Shared types for waypoint launcher plugins.
//!
//! Plugins speak newline-delimited JSON with the launcher: one request object
//! per line on stdin, one response object per handled request on stdout.
//! Every type here is serializable in both directions so the host side and
//! tests can parse what a plugin emits.

use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize a Vec that may be null or missing (both become empty vec)
fn deserialize_null_as_empty_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let opt: Option<Vec<T>> = Option::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// Deserialize `IndexMode` leniently: unknown strings read as no mode (full).
fn deserialize_index_mode<'de, D>(deserializer: D) -> Result<Option<IndexMode>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(match opt.as_deref() {
        Some("incremental") => Some(IndexMode::Incremental),
        Some("full") => Some(IndexMode::Full),
        _ => None,
    })
}

/// Protocol step requested by the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    #[default]
    Initial,
    Search,
    Index,
    Action,
    Form,
    Match,
    /// Any step this protocol revision does not know about
    #[serde(other)]
    Unknown,
}

/// Index mode for plugin index requests and responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexMode {
    Full,
    Incremental,
}

/// Item selected by the user in the launcher
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedItem {
    #[serde(default)]
    pub id: String,
}

impl SelectedItem {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// One request line read from the host.
///
/// Fields irrelevant to a step are simply absent; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginRequest {
    #[serde(default)]
    pub step: Step,

    #[serde(
        default,
        deserialize_with = "deserialize_index_mode",
        skip_serializing_if = "Option::is_none"
    )]
    pub mode: Option<IndexMode>,

    #[serde(
        default,
        deserialize_with = "deserialize_null_as_empty_vec",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub indexed_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<SelectedItem>,
}

impl PluginRequest {
    #[must_use]
    pub fn index(mode: IndexMode, indexed_ids: Vec<String>) -> Self {
        Self {
            step: Step::Index,
            mode: Some(mode),
            indexed_ids,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn action(item_id: impl Into<String>, action: Option<&str>) -> Self {
        Self {
            step: Step::Action,
            action: action.map(str::to_string),
            selected: Some(SelectedItem::new(item_id)),
            ..Default::default()
        }
    }

    /// Id of the selected item, empty when the host sent none
    #[must_use]
    pub fn selected_id(&self) -> &str {
        self.selected.as_ref().map_or("", |s| s.id.as_str())
    }
}

/// Response written to stdout, one JSON object per line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PluginResponse {
    Index {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mode: Option<IndexMode>,

        items: Vec<IndexItem>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        remove: Option<Vec<String>>,
    },

    Execute {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        close: Option<bool>,
    },

    Error {
        message: String,
    },
}

impl PluginResponse {
    /// Complete replacement of the host's index for this plugin.
    ///
    /// Never carries `remove`: the host drops everything it had.
    #[must_use]
    pub fn full_index(items: Vec<IndexItem>) -> Self {
        Self::Index {
            mode: Some(IndexMode::Full),
            items,
            remove: None,
        }
    }

    #[must_use]
    pub fn incremental_index(items: Vec<IndexItem>, remove: Vec<String>) -> Self {
        Self::Index {
            mode: Some(IndexMode::Incremental),
            items,
            remove: Some(remove),
        }
    }

    #[must_use]
    pub fn close() -> Self {
        Self::Execute { close: Some(true) }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// Replayable request the host stores alongside an indexed item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub step: Step,
    pub selected: SelectedItem,
}

/// Item the plugin contributes to the launcher's search index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexItem {
    pub id: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verb: Option<String>,

    /// Keywords for enhanced searchability
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "deserialize_null_as_empty_vec"
    )]
    pub keywords: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<EntryPoint>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<PreviewData>,

    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "deserialize_null_as_empty_vec"
    )]
    pub actions: Vec<Action>,
}

/// How the host should render preview content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewKind {
    #[default]
    Text,
    Markdown,
    Image,
}

/// Preview data for side panel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewData {
    #[serde(rename = "type", default)]
    pub kind: PreviewKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<MetadataItem>,
}

/// Metadata key-value pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataItem {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Secondary action on an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub keep_open: bool,
}

impl Action {
    #[must_use]
    pub fn new(id: &str, name: &str, icon: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            icon: Some(icon.to_string()),
            keep_open: false,
        }
    }
}
