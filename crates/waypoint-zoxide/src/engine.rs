//! Plugin event loop.
//!
//! One task drives everything: it waits for a request line, a poll timeout,
//! a database wake-up or a termination signal, handles that one event to
//! completion, then checks the database marker. All state lives here.

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use notify::RecommendedWatcher;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use waypoint_types::{IndexItem, IndexMode, PluginRequest, PluginResponse, Step};

use crate::Result;
use crate::actions::ActionDispatcher;
use crate::config::{Directories, Settings};
use crate::diff::diff;
use crate::item::{ItemBuilder, item_id};
use crate::platform::WindowManager;
use crate::source::ZoxideSource;
use crate::watch::{self, ChangeDetector};

/// What ended a wait
enum Wake {
    /// Bytes appended to the line buffer; 0 means end of input
    Input(usize),
    Timeout,
    Changed,
    Shutdown,
}

pub struct Engine {
    source: ZoxideSource,
    items: ItemBuilder,
    actions: ActionDispatcher,
    detector: ChangeDetector,
    poll_interval: Duration,
    wake_rx: Option<mpsc::UnboundedReceiver<()>>,
    _watcher: Option<RecommendedWatcher>,
}

impl Engine {
    #[must_use]
    pub fn new(settings: &Settings, dirs: &Directories, window_manager: WindowManager) -> Self {
        let database = settings
            .database
            .clone()
            .unwrap_or_else(|| dirs.zoxide_db.clone());

        let (watcher, wake_rx) = if settings.watch {
            match watch::spawn_watcher(&database) {
                Ok((watcher, rx)) => (Some(watcher), Some(rx)),
                Err(e) => {
                    warn!("Falling back to polling {}: {e}", database.display());
                    (None, None)
                }
            }
        } else {
            (None, None)
        };

        info!(
            "Engine ready: database={}, wm={}, poll={:?}",
            database.display(),
            window_manager.as_str(),
            settings.poll_interval()
        );

        Self {
            source: ZoxideSource::new(settings),
            items: ItemBuilder::new(dirs.home.clone(), settings.preview_limit),
            actions: ActionDispatcher::new(settings, window_manager),
            detector: ChangeDetector::new(database),
            poll_interval: settings.poll_interval(),
            wake_rx,
            _watcher: watcher,
        }
    }

    /// Override the poll interval, mainly for sub-second intervals in tests.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Run until end of input or SIGTERM/SIGINT.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing a response fails.
    pub async fn run<R, W>(&mut self, input: R, output: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        self.run_until(input, output, shutdown_signal()).await
    }

    /// Run until end of input or until `shutdown` completes.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing a response fails.
    pub async fn run_until<R, W, S>(
        &mut self,
        mut input: R,
        mut output: W,
        shutdown: S,
    ) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
        S: Future<Output = ()>,
    {
        self.emit_full_index(&mut output).await?;

        // Raw bytes: a line that is not UTF-8 is dropped like any malformed request.
        // A read cancelled by another branch leaves its partial line here.
        let mut buf = Vec::new();
        let mut shutdown = std::pin::pin!(shutdown);

        loop {
            let wake = tokio::select! {
                read = input.read_until(b'\n', &mut buf) => Wake::Input(read?),
                () = tokio::time::sleep(self.poll_interval) => Wake::Timeout,
                Some(()) = recv_wake(&mut self.wake_rx) => Wake::Changed,
                () = &mut shutdown => Wake::Shutdown,
            };

            match wake {
                Wake::Input(0) if buf.is_empty() => {
                    info!("Input closed, exiting");
                    return Ok(());
                }
                Wake::Shutdown => {
                    info!("Termination requested, exiting");
                    return Ok(());
                }
                Wake::Input(read) => {
                    // A change seen before the request is reported before its response
                    self.refresh_if_changed(&mut output).await?;
                    let line = std::mem::take(&mut buf);
                    self.handle_bytes(&line, &mut output).await?;

                    // Final line without a trailing newline
                    if read == 0 {
                        info!("Input closed, exiting");
                        return Ok(());
                    }
                }
                Wake::Timeout | Wake::Changed => {}
            }

            self.refresh_if_changed(&mut output).await?;
        }
    }

    async fn handle_bytes<W>(&self, bytes: &[u8], output: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        match std::str::from_utf8(bytes) {
            Ok(line) => self.handle_line(line, output).await,
            Err(e) => {
                debug!("Dropping request that is not UTF-8: {e}");
                Ok(())
            }
        }
    }

    async fn handle_line<W>(&self, line: &str, output: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        if line.trim().is_empty() {
            return Ok(());
        }

        let request: PluginRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                debug!("Dropping malformed request ({e}): {line}");
                return Ok(());
            }
        };

        let response = self.handle_request(&request).await;
        write_response(output, &response).await
    }

    /// Compute the response to one request.
    pub async fn handle_request(&self, request: &PluginRequest) -> PluginResponse {
        debug!("Request: {:?}", request.step);
        match request.step {
            Step::Index => self.index(request.mode, &request.indexed_ids).await,
            Step::Action => self.actions.dispatch(request).await,
            _ => PluginResponse::error("Invalid request"),
        }
    }

    async fn index(&self, mode: Option<IndexMode>, indexed_ids: &[String]) -> PluginResponse {
        let entries = self.source.query().await;

        if mode == Some(IndexMode::Incremental) {
            let known: HashSet<String> = indexed_ids.iter().cloned().collect();
            let delta = diff(entries, &known, |entry| item_id(&entry.path));
            debug!(
                "Incremental index: +{} -{}",
                delta.added.len(),
                delta.removed.len()
            );
            PluginResponse::incremental_index(self.items.build_all(&delta.added), delta.removed)
        } else {
            PluginResponse::full_index(self.items.build_all(&entries))
        }
    }

    /// Current snapshot as launcher items.
    pub async fn snapshot(&self) -> Vec<IndexItem> {
        let entries = self.source.query().await;
        self.items.build_all(&entries)
    }

    /// Write an unsolicited full index.
    ///
    /// # Errors
    ///
    /// Returns an error if the response cannot be written.
    pub async fn emit_full_index<W>(&self, output: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let items = self.snapshot().await;
        info!("Emitting full index ({} items)", items.len());
        write_response(output, &PluginResponse::full_index(items)).await
    }

    async fn refresh_if_changed<W>(&mut self, output: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        if self.detector.poll() {
            info!("{} changed, reindexing", self.detector.path().display());
            self.emit_full_index(output).await?;
        }
        Ok(())
    }
}

async fn recv_wake(rx: &mut Option<mpsc::UnboundedReceiver<()>>) -> Option<()> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// One JSON object per line, flushed so the host sees it immediately.
async fn write_response<W>(output: &mut W, response: &PluginResponse) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(response)?;
    line.push(b'\n');
    output.write_all(&line).await?;
    output.flush().await?;
    Ok(())
}

/// Resolves on SIGTERM or SIGINT.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = term.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {e}");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn engine_with_query(temp: &TempDir, script: &str) -> Engine {
        let settings = Settings {
            query_command: vec!["sh".to_string(), "-c".to_string(), script.to_string()],
            watch: false,
            ..Default::default()
        };
        let dirs = Directories::with_base(temp.path().to_path_buf());
        Engine::new(&settings, &dirs, WindowManager::Hyprland)
    }

    fn make_dir(temp: &TempDir, name: &str) -> PathBuf {
        let path = temp.path().join(name);
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    #[tokio::test]
    async fn test_unknown_step_is_invalid_request() {
        let temp = TempDir::new().unwrap();
        let engine = engine_with_query(&temp, "true");

        for json in [r#"{"step":"search","query":"x"}"#, "{}", r#"{"step":"nope"}"#] {
            let request: PluginRequest = serde_json::from_str(json).unwrap();
            assert_eq!(
                engine.handle_request(&request).await,
                PluginResponse::error("Invalid request")
            );
        }
    }

    #[tokio::test]
    async fn test_full_index_request() {
        let temp = TempDir::new().unwrap();
        let a = make_dir(&temp, "a");
        let engine = engine_with_query(&temp, &format!("echo '1.0 {}'", a.display()));

        let response = engine
            .handle_request(&PluginRequest::index(IndexMode::Full, vec!["zoxide:/x".into()]))
            .await;

        let PluginResponse::Index {
            mode,
            items,
            remove,
        } = response
        else {
            panic!("Expected index response");
        };
        assert_eq!(mode, Some(IndexMode::Full));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "a");
        assert!(remove.is_none());
    }

    #[tokio::test]
    async fn test_missing_mode_is_full_index() {
        let temp = TempDir::new().unwrap();
        let engine = engine_with_query(&temp, "true");
        let request: PluginRequest = serde_json::from_str(r#"{"step":"index"}"#).unwrap();

        assert_eq!(
            engine.handle_request(&request).await,
            PluginResponse::full_index(vec![])
        );
    }

    #[tokio::test]
    async fn test_incremental_index_request() {
        let temp = TempDir::new().unwrap();
        let a = make_dir(&temp, "a");
        let b = make_dir(&temp, "b");
        let engine = engine_with_query(
            &temp,
            &format!("echo '2.0 {}'; echo '1.0 {}'", a.display(), b.display()),
        );

        let known = vec![item_id(&a.to_string_lossy()), "zoxide:/gone".to_string()];
        let response = engine
            .handle_request(&PluginRequest::index(IndexMode::Incremental, known))
            .await;

        let PluginResponse::Index {
            mode,
            items,
            remove,
        } = response
        else {
            panic!("Expected index response");
        };
        assert_eq!(mode, Some(IndexMode::Incremental));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, item_id(&b.to_string_lossy()));
        assert_eq!(remove, Some(vec!["zoxide:/gone".to_string()]));
    }

    #[tokio::test]
    async fn test_absent_tool_gives_empty_index_not_error() {
        let temp = TempDir::new().unwrap();
        let settings = Settings {
            query_command: vec!["/nonexistent/zoxide".to_string()],
            watch: false,
            ..Default::default()
        };
        let dirs = Directories::with_base(temp.path().to_path_buf());
        let engine = Engine::new(&settings, &dirs, WindowManager::Hyprland);

        let response = engine
            .handle_request(&PluginRequest::index(IndexMode::Incremental, vec![]))
            .await;
        assert_eq!(response, PluginResponse::incremental_index(vec![], vec![]));
    }

    #[tokio::test]
    async fn test_write_response_is_one_line() {
        let mut out = Vec::new();
        write_response(&mut out, &PluginResponse::close()).await.unwrap();
        assert_eq!(out, b"{\"type\":\"execute\",\"close\":true}\n");
    }
}
