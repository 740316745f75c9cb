//! logdiag CLI - watches build logs and prints extracted problems.
//!
//! ```text
//! main() -> load config -> WatchSession::new()
//!              |                |
//!              |   --once       +-> scan_once() -> print snapshot -> exit code
//!              |
//!              +-> start_watching() -> process_next() loop until Ctrl-C
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use logdiag_config::{ClearPolicy, LogdiagConfig, WatchConfig};
use logdiag_core::presets;
use logdiag_watch::{DiagnosticsStore, Notice, NoticeLevel, WatchSession};

/// Events handled per wake-up before printing.
const EVENT_BUDGET: usize = 64;

#[derive(Parser, Debug)]
#[command(name = "logdiag", version, about = "Build log problem matcher")]
struct Cli {
    /// Log file paths or wildcards. Replaces `[watch].paths` from the config.
    paths: Vec<String>,

    /// Path to a custom `config.toml` (default: `~/.logdiag/config.toml`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Workspace root for relative paths (default: current directory).
    #[arg(long)]
    root: Option<PathBuf>,

    /// Run a single pass, print the results, and exit.
    #[arg(long)]
    once: bool,

    /// Which published diagnostics a pass replaces.
    #[arg(long, value_enum)]
    clear: Option<ClearArg>,

    /// Built-in pattern presets to add (e.g., `--preset gcc`).
    #[arg(long, num_args = 1..)]
    preset: Vec<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ClearArg {
    File,
    All,
}

impl From<ClearArg> for ClearPolicy {
    fn from(arg: ClearArg) -> Self {
        match arg {
            ClearArg::File => ClearPolicy::File,
            ClearArg::All => ClearPolicy::All,
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap_or_else(|_| EnvFilter::new("error"));

    // stdout carries diagnostics; logs go to stderr. Notices are printed
    // separately, so the default level stays quiet.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn load_config(cli: &Cli) -> Result<WatchConfig> {
    let loaded = match &cli.config {
        Some(path) => Some(LogdiagConfig::load_from(path)?),
        None => LogdiagConfig::load()?,
    };
    let mut config = loaded.map_or_else(
        || WatchConfig::new(Vec::new(), Vec::new()),
        LogdiagConfig::into_watch_config,
    );

    if !cli.paths.is_empty() {
        config = config.with_paths(cli.paths.clone());
    }
    if let Some(clear) = cli.clear {
        config = config.with_clear_policy(clear.into());
    }
    if !cli.preset.is_empty() {
        let mut patterns = config.patterns().to_vec();
        for name in &cli.preset {
            let spec = presets::preset(name).with_context(|| {
                format!(
                    "unknown preset '{name}' (known: {})",
                    presets::PRESET_NAMES.join(", ")
                )
            })?;
            patterns.push(spec);
        }
        config = config.with_patterns(patterns);
    }
    Ok(config)
}

fn print_notices(notices: Vec<Notice>) {
    for notice in notices {
        let label = match notice.level() {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        eprintln!("logdiag: {label}: {}", notice.message());
    }
}

fn print_snapshot(store: &DiagnosticsStore) -> Result<usize> {
    let snapshot = store.snapshot();
    let mut out = std::io::stdout().lock();
    for (path, diagnostics) in snapshot.files() {
        for diagnostic in diagnostics {
            writeln!(out, "{}", diagnostic.display_with_path(path))?;
        }
    }
    if !snapshot.is_empty() {
        writeln!(out, "{}", snapshot.status_string())?;
    }
    out.flush()?;
    Ok(snapshot.error_count())
}

async fn watch(session: &mut WatchSession<DiagnosticsStore>) -> Result<()> {
    if session.start_watching().is_err() {
        print_notices(session.drain_notices());
        anyhow::bail!("could not start watching");
    }
    print_notices(session.drain_notices());
    print_snapshot(session.sink())?;

    loop {
        tokio::select! {
            handled = session.process_next(EVENT_BUDGET) => {
                if handled.is_none() {
                    tracing::warn!("Watcher stopped unexpectedly");
                    break;
                }
                print_notices(session.drain_notices());
                print_snapshot(session.sink())?;
            }
            result = tokio::signal::ctrl_c() => {
                result.context("failed to listen for Ctrl-C")?;
                break;
            }
        }
    }

    session.stop_watching();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    let root = match cli.root.clone() {
        Some(root) => Some(root),
        None => std::env::current_dir().ok(),
    };
    let mut session = WatchSession::new(config, root, DiagnosticsStore::new());

    if cli.once {
        let scanned = session.scan_once();
        print_notices(session.drain_notices());
        if scanned.is_err() {
            return Ok(ExitCode::from(2));
        }
        let errors = print_snapshot(session.sink())?;
        return Ok(if errors > 0 {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        });
    }

    watch(&mut session).await?;
    Ok(ExitCode::SUCCESS)
}
