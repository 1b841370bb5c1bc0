//! waypoint-zoxide entry point.
//!
//! Speaks the plugin protocol on stdin/stdout; logs go to stderr.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use waypoint_zoxide::Engine;
use waypoint_zoxide::config::{Directories, Settings};
use waypoint_zoxide::platform::WindowManager;

/// Frecent directories from zoxide for the waypoint launcher
#[derive(Parser, Debug)]
#[command(name = "waypoint-zoxide")]
#[command(version, about, long_about = None)]
struct Args {
    /// Config file (defaults to `$XDG_CONFIG_HOME/waypoint/zoxide.json`)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Seconds between database checks when nothing else happens
    #[arg(long, value_name = "SECS")]
    poll_interval: Option<u64>,

    /// Print one full index and exit
    #[arg(long)]
    once: bool,
}

/// Set up logging on stderr; stdout belongs to the protocol.
/// Debug builds additionally log to a timestamped file in the temp dir.
fn setup_logging() {
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("waypoint={default_level}")));

    if cfg!(debug_assertions) {
        let temp_dir = std::env::temp_dir();
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let log_filename = format!("waypoint-zoxide-{timestamp}.log");

        let file_appender = tracing_appender::rolling::never(&temp_dir, &log_filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        std::mem::forget(guard);

        let file_layer = fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_line_number(true);

        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .with_target(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(file_layer)
            .with(stderr_layer)
            .with(filter)
            .init();
    } else {
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .with_target(true);

        tracing_subscriber::registry()
            .with(stderr_layer)
            .with(filter)
            .init();
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let dirs = Directories::new()?;
    let config_path = args.config.unwrap_or_else(|| dirs.config_file.clone());
    let mut settings = Settings::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    if let Some(secs) = args.poll_interval {
        settings.poll_interval_secs = secs;
    }

    let mut engine = Engine::new(&settings, &dirs, WindowManager::detect());
    let mut stdout = tokio::io::stdout();

    if args.once {
        engine.emit_full_index(&mut stdout).await?;
        return Ok(());
    }

    engine
        .run(BufReader::new(tokio::io::stdin()), stdout)
        .await?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    setup_logging();

    info!("Starting waypoint-zoxide...");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run(args));

    // Stdin is read on a blocking thread; waiting for it would delay exit until the next line
    runtime.shutdown_background();

    info!("waypoint-zoxide stopped");
    result
}
