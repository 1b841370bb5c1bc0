//! Window manager detection
//!
//! Picks the compositor whose IPC is used to spawn detached processes.

use std::env;

/// Compositors the plugin can spawn through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowManager {
    /// Niri compositor (Wayland)
    Niri,
    /// Hyprland compositor (Wayland)
    Hyprland,
}

impl WindowManager {
    /// Detect the running compositor. Anything without a Niri socket is treated as Hyprland.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_niri_socket(env::var_os("NIRI_SOCKET").as_deref())
    }

    fn from_niri_socket(socket: Option<&std::ffi::OsStr>) -> Self {
        match socket {
            Some(s) if !s.is_empty() => Self::Niri,
            _ => Self::Hyprland,
        }
    }

    /// Command prefix that asks the compositor to spawn what follows `--`
    #[must_use]
    pub fn spawn_prefix(self) -> &'static [&'static str] {
        match self {
            Self::Niri => &["niri", "msg", "action", "spawn", "--"],
            Self::Hyprland => &["hyprctl", "dispatch", "exec", "--"],
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Niri => "niri",
            Self::Hyprland => "hyprland",
        }
    }
}
