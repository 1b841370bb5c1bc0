//! Action requests against indexed directories.

use std::time::Duration;

use tracing::{info, warn};
use waypoint_types::{PluginRequest, PluginResponse};

use crate::Result;
use crate::config::Settings;
use crate::item::{self, ACTION_COPY, ACTION_FILES};
use crate::platform::WindowManager;
use crate::process;
use crate::terminal;

/// What an action request resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryAction {
    OpenFiles,
    CopyPath,
    OpenTerminal,
}

impl DirectoryAction {
    /// Unknown or missing action ids open a terminal, the item's primary verb.
    #[must_use]
    pub fn from_id(action: Option<&str>) -> Self {
        match action {
            Some(ACTION_FILES) => Self::OpenFiles,
            Some(ACTION_COPY) => Self::CopyPath,
            _ => Self::OpenTerminal,
        }
    }
}

/// Runs the side effects of action requests
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    terminal: String,
    window_manager: WindowManager,
    file_opener: Vec<String>,
    clipboard_command: Vec<String>,
    clipboard_timeout: Duration,
}

impl ActionDispatcher {
    #[must_use]
    pub fn new(settings: &Settings, window_manager: WindowManager) -> Self {
        Self {
            terminal: settings.terminal_program(),
            window_manager,
            file_opener: settings.file_opener.clone(),
            clipboard_command: settings.clipboard_command.clone(),
            clipboard_timeout: settings.clipboard_timeout(),
        }
    }

    /// Handle one `action` request. Failures become error responses.
    pub async fn dispatch(&self, request: &PluginRequest) -> PluginResponse {
        match self.run(request).await {
            Ok(()) => PluginResponse::close(),
            Err(e) => {
                warn!("Action on {:?} failed: {e}", request.selected_id());
                PluginResponse::error(e.to_string())
            }
        }
    }

    async fn run(&self, request: &PluginRequest) -> Result<()> {
        let path = item::path_from_id(request.selected_id())?;
        let action = DirectoryAction::from_id(request.action.as_deref());
        info!("{action:?}: {path}");

        match action {
            DirectoryAction::OpenFiles => {
                let mut cmd = self.file_opener.clone();
                cmd.push(path.to_string());
                process::spawn_detached(&cmd)
            }
            DirectoryAction::CopyPath => {
                process::pipe_with_timeout(
                    &self.clipboard_command,
                    path.as_bytes(),
                    self.clipboard_timeout,
                )
                .await
            }
            DirectoryAction::OpenTerminal => {
                let cmd = terminal::build_command(&self.terminal, path, self.window_manager);
                process::spawn_detached(&cmd)
            }
        }
    }
}
