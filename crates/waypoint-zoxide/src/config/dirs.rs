use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};

use crate::{Error, Result};

const CONFIG_FILENAME: &str = "zoxide.json";

/// Paths the plugin reads, following the XDG spec
#[derive(Debug, Clone)]
pub struct Directories {
    /// Config directory (~/.config/waypoint)
    pub config: PathBuf,

    /// Config file path (~/.config/waypoint/zoxide.json)
    pub config_file: PathBuf,

    /// Home directory, used to shorten display paths
    pub home: PathBuf,

    /// zoxide database (~/.local/share/zoxide/db.zo or `$_ZO_DATA_DIR/db.zo`)
    pub zoxide_db: PathBuf,
}

impl Directories {
    /// Resolve the standard XDG paths for the current user.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        let base = BaseDirs::new()
            .ok_or_else(|| Error::Config("Failed to determine home directory".to_string()))?;
        let project = ProjectDirs::from("", "", "waypoint")
            .ok_or_else(|| Error::Config("Failed to determine project directories".to_string()))?;

        let config = project.config_dir().to_path_buf();

        Ok(Self {
            config_file: config.join(CONFIG_FILENAME),
            config,
            home: base.home_dir().to_path_buf(),
            zoxide_db: zoxide_database(base.data_dir(), std::env::var_os("_ZO_DATA_DIR")),
        })
    }

    #[must_use]
    pub fn with_base(base: PathBuf) -> Self {
        Self {
            config_file: base.join(CONFIG_FILENAME),
            zoxide_db: base.join("zoxide").join("db.zo"),
            home: base.clone(),
            config: base,
        }
    }
}

/// zoxide honours `_ZO_DATA_DIR` before falling back to the XDG data dir.
fn zoxide_database(data_dir: &Path, override_dir: Option<std::ffi::OsString>) -> PathBuf {
    match override_dir {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir).join("db.zo"),
        _ => data_dir.join("zoxide").join("db.zo"),
    }
}
