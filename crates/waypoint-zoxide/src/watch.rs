//! zoxide database change detection.
//!
//! The modification time of the database is the source of truth. The
//! `notify` watcher only wakes the event loop early; whether anything changed
//! is always decided by comparing markers.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::{Error, Result};

/// Last observed modification time; `None` while the file does not exist
pub type Marker = Option<SystemTime>;

#[must_use]
pub fn read_marker(path: &Path) -> Marker {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Tracks the watched file's marker across loop iterations
#[derive(Debug)]
pub struct ChangeDetector {
    path: PathBuf,
    last: Marker,
}

impl ChangeDetector {
    /// Start tracking from the file's current state.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        let last = read_marker(&path);
        Self { path, last }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true exactly once per observed change.
    ///
    /// A missing file is not a change; the previous marker is kept so the
    /// file reappearing with a new mtime is reported.
    pub fn poll(&mut self) -> bool {
        let Some(current) = read_marker(&self.path) else {
            return false;
        };

        if self.last == Some(current) {
            return false;
        }

        debug!("{} modified", self.path.display());
        self.last = Some(current);
        true
    }
}

/// Watch the directory holding `path` and send a wake-up for every event on it.
///
/// zoxide replaces its database by renaming a temporary file, so the parent
/// directory is watched rather than the file itself. The returned watcher must
/// be kept alive for events to arrive.
///
/// # Errors
///
/// Returns an error if the path has no parent directory or it cannot be watched.
pub fn spawn_watcher(path: &Path) -> Result<(RecommendedWatcher, mpsc::UnboundedReceiver<()>)> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| Error::Config(format!("Invalid database path: {}", path.display())))?;
    let file_name = path.file_name().map(ToOwned::to_owned);

    let (tx, rx) = mpsc::unbounded_channel();

    let mut watcher =
        notify::recommended_watcher(move |result: notify::Result<notify::Event>| match result {
            Ok(event) => match event.kind {
                EventKind::Modify(_) | EventKind::Create(_) => {
                    if event
                        .paths
                        .iter()
                        .any(|p| p.file_name() == file_name.as_deref())
                    {
                        let _ = tx.send(());
                    }
                }
                _ => {}
            },
            Err(e) => error!("Watcher error: {e}"),
        })?;

    watcher.watch(parent, RecursiveMode::NonRecursive)?;
    info!("Watching zoxide database: {}", path.display());

    Ok((watcher, rx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::time::Duration;
    use tempfile::TempDir;

    fn touch(path: &Path, secs: u64) {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    #[test]
    fn test_unchanged_file_is_not_a_change() {
        let temp = TempDir::new().unwrap();
        let db = temp.path().join("db.zo");
        touch(&db, 1_000);

        let mut detector = ChangeDetector::new(db);
        assert!(!detector.poll());
        assert!(!detector.poll());
    }

    #[test]
    fn test_change_is_reported_once() {
        let temp = TempDir::new().unwrap();
        let db = temp.path().join("db.zo");
        touch(&db, 1_000);

        let mut detector = ChangeDetector::new(db.clone());
        touch(&db, 2_000);

        assert!(detector.poll());
        assert!(!detector.poll());
    }

    #[test]
    fn test_missing_file_is_not_a_change() {
        let temp = TempDir::new().unwrap();
        let db = temp.path().join("db.zo");

        let mut detector = ChangeDetector::new(db.clone());
        assert!(!detector.poll());

        touch(&db, 1_000);
        assert!(detector.poll());

        fs::remove_file(&db).unwrap();
        assert!(!detector.poll());

        touch(&db, 1_000);
        assert!(!detector.poll(), "same mtime as before removal");
    }

    #[test]
    fn test_spawn_watcher_rejects_bare_name() {
        assert!(spawn_watcher(Path::new("db.zo")).is_err());
    }

    #[tokio::test]
    async fn test_watcher_wakes_on_write() {
        let temp = TempDir::new().unwrap();
        let db = temp.path().join("db.zo");
        let (_watcher, mut rx) = spawn_watcher(&db).unwrap();

        fs::write(&db, b"data").unwrap();

        let woke = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(matches!(woke, Ok(Some(()))));
    }
}
