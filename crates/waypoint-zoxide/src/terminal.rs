//! Terminal command construction.
//!
//! Every terminal spells "start in this directory" differently. The table
//! below maps a program to its flag style; the result is wrapped in the
//! compositor's spawn invocation so the terminal outlives the plugin.

use std::path::Path;

use crate::platform::WindowManager;

/// How a terminal program takes its starting directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirFlag {
    /// `--flag=<dir>`
    Joined(&'static str),
    /// `<flag> <dir>`
    Separate(&'static str),
    /// `<subcommand> <flag> <dir>`
    Subcommand(&'static str, &'static str),
}

/// Known terminals: program name, extra leading args, directory flag.
const TERMINALS: &[(&str, &[&str], DirFlag)] = &[
    // Single-instance mode would ignore the working directory of a new window
    (
        "ghostty",
        &["--gtk-single-instance=false"],
        DirFlag::Joined("--working-directory"),
    ),
    ("kitty", &[], DirFlag::Separate("-d")),
    ("alacritty", &[], DirFlag::Separate("--working-directory")),
    ("wezterm", &[], DirFlag::Subcommand("start", "--cwd")),
    ("wezterm-gui", &[], DirFlag::Subcommand("start", "--cwd")),
    ("konsole", &[], DirFlag::Separate("--workdir")),
    ("foot", &[], DirFlag::Separate("-D")),
];

const FALLBACK: DirFlag = DirFlag::Joined("--working-directory");
const NO_EXTRA: &[&str] = &[];

/// Lowercased basename used as the table key (`/usr/bin/Kitty` → `kitty`)
fn program_key(terminal: &str) -> String {
    Path::new(terminal)
        .file_name()
        .map_or_else(|| terminal.to_string(), |n| n.to_string_lossy().into_owned())
        .to_lowercase()
}

/// Command that opens `terminal` at `path`, without any compositor wrapper.
#[must_use]
pub fn terminal_args(terminal: &str, path: &str) -> Vec<String> {
    let key = program_key(terminal);
    let (extra, flag) = TERMINALS
        .iter()
        .find(|(name, _, _)| *name == key)
        .map_or((NO_EXTRA, FALLBACK), |(_, extra, flag)| (*extra, *flag));

    let mut cmd = vec![terminal.to_string()];
    cmd.extend(extra.iter().map(|s| (*s).to_string()));
    match flag {
        DirFlag::Joined(f) => cmd.push(format!("{f}={path}")),
        DirFlag::Separate(f) => {
            cmd.push(f.to_string());
            cmd.push(path.to_string());
        }
        DirFlag::Subcommand(sub, f) => {
            cmd.push(sub.to_string());
            cmd.push(f.to_string());
            cmd.push(path.to_string());
        }
    }
    cmd
}

/// Full command vector: compositor spawn prefix followed by the terminal invocation.
#[must_use]
pub fn build_command(terminal: &str, path: &str, wm: WindowManager) -> Vec<String> {
    wm.spawn_prefix()
        .iter()
        .map(|s| (*s).to_string())
        .chain(terminal_args(terminal, path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kitty_ends_with_short_dir_flag() {
        let cmd = build_command("kitty", "/tmp/x", WindowManager::Hyprland);
        assert!(cmd.ends_with(&["-d".to_string(), "/tmp/x".to_string()]));
    }

    #[test]
    fn test_hyprland_wrapper() {
        let cmd = build_command("foot", "/srv", WindowManager::Hyprland);
        assert_eq!(
            cmd,
            vec!["hyprctl", "dispatch", "exec", "--", "foot", "-D", "/srv"]
        );
    }

    #[test]
    fn test_niri_wrapper() {
        let cmd = build_command("alacritty", "/srv", WindowManager::Niri);
        assert_eq!(
            cmd,
            vec![
                "niri",
                "msg",
                "action",
                "spawn",
                "--",
                "alacritty",
                "--working-directory",
                "/srv"
            ]
        );
    }

    #[test]
    fn test_ghostty_disables_single_instance() {
        let cmd = terminal_args("ghostty", "/home/u");
        assert_eq!(
            cmd,
            vec![
                "ghostty",
                "--gtk-single-instance=false",
                "--working-directory=/home/u"
            ]
        );
    }

    #[test]
    fn test_wezterm_uses_start_subcommand() {
        for name in ["wezterm", "wezterm-gui"] {
            let cmd = terminal_args(name, "/a b");
            assert_eq!(cmd, vec![name, "start", "--cwd", "/a b"]);
        }
    }

    #[test]
    fn test_konsole_workdir() {
        assert_eq!(
            terminal_args("konsole", "/x"),
            vec!["konsole", "--workdir", "/x"]
        );
    }

    #[test]
    fn test_unknown_terminal_falls_back_to_long_flag() {
        assert_eq!(
            terminal_args("xterm", "/x"),
            vec!["xterm", "--working-directory=/x"]
        );
    }

    #[test]
    fn test_full_path_and_case_are_matched_by_basename() {
        let cmd = terminal_args("/usr/bin/Kitty", "/x");
        assert_eq!(cmd, vec!["/usr/bin/Kitty", "-d", "/x"]);
    }
}
