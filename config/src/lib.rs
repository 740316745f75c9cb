//! Configuration loading for logdiag.
//!
//! Raw TOML structs (with `Option` fields) stay private to this crate. The
//! loader resolves them into [`WatchConfig`] at the parse boundary: presets
//! are expanded into patterns and intervals get their defaults.
//!
//! ```toml
//! [watch]
//! paths = ["build/*.log"]
//! clear = "file"
//! poll_interval_ms = 500
//! rescan_interval_ms = 5000
//! source = "Build Log"
//! presets = ["gcc"]
//!
//! [[patterns]]
//! regexp = '^(.*):(\d+):(\d+):\s+(warning|error|note):\s+(.*)$'
//! file = 1
//! line = 2
//! column = 3
//! severity = 4
//! message = 5
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use logdiag_core::presets;
use logdiag_types::{DEFAULT_SOURCE_LABEL, PatternSpec};
use serde::Deserialize;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_RESCAN_INTERVAL: Duration = Duration::from_secs(5);

/// Intervals below this are raised to it.
const MIN_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

/// How previously published diagnostics are cleared before a pass publishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClearPolicy {
    /// Clear only the bucket keyed by the log file itself.
    #[default]
    File,
    /// Clear every published bucket.
    All,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawWatchSection {
    #[serde(default)]
    paths: Vec<String>,
    clear: Option<ClearPolicy>,
    poll_interval_ms: Option<u64>,
    rescan_interval_ms: Option<u64>,
    source: Option<String>,
    #[serde(default)]
    presets: Vec<String>,
}

/// Top-level shape of `config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct LogdiagConfig {
    #[serde(default)]
    watch: RawWatchSection,
    #[serde(default)]
    patterns: Vec<PatternSpec>,
}

impl LogdiagConfig {
    /// Load from the default location (`~/.logdiag/config.toml`).
    ///
    /// A missing file is not an error.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path).map(Some),
            _ => Ok(None),
        }
    }

    /// Load from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        toml::from_str(&content).map_err(|err| {
            tracing::warn!("Failed to parse config at {:?}: {}", path, err);
            ConfigError::Parse {
                path: path.to_path_buf(),
                source: err,
            }
        })
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// Resolve into the validated watch configuration.
    ///
    /// Unknown preset names are logged and skipped.
    #[must_use]
    pub fn into_watch_config(self) -> WatchConfig {
        let raw = self.watch;
        let mut patterns = self.patterns;
        for name in &raw.presets {
            match presets::preset(name) {
                Some(spec) => patterns.push(spec),
                None => tracing::warn!(
                    "Unknown pattern preset '{name}'; known presets: {}",
                    presets::PRESET_NAMES.join(", ")
                ),
            }
        }

        let mut config = WatchConfig::new(raw.paths, patterns)
            .with_clear_policy(raw.clear.unwrap_or_default());
        if let Some(ms) = raw.poll_interval_ms {
            config = config.with_poll_interval(Duration::from_millis(ms));
        }
        if let Some(ms) = raw.rescan_interval_ms {
            config = config.with_rescan_interval(Duration::from_millis(ms));
        }
        if let Some(source) = raw.source {
            config = config.with_source(source);
        }
        config
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".logdiag").join("config.toml"))
}

fn clamp_interval(name: &str, interval: Duration) -> Duration {
    if interval < MIN_INTERVAL {
        tracing::warn!(
            "{name} of {}ms is too small; using {}ms",
            interval.as_millis(),
            MIN_INTERVAL.as_millis()
        );
        MIN_INTERVAL
    } else {
        interval
    }
}

/// Resolved watch configuration consumed by the watch session.
///
/// May still be incomplete (no paths or no patterns); the session reports
/// that as a user-visible error when watching is started.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    paths: Vec<String>,
    patterns: Vec<PatternSpec>,
    clear: ClearPolicy,
    poll_interval: Duration,
    rescan_interval: Duration,
    source: String,
}

impl WatchConfig {
    #[must_use]
    pub fn new(paths: Vec<String>, patterns: Vec<PatternSpec>) -> Self {
        Self {
            paths,
            patterns,
            clear: ClearPolicy::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            rescan_interval: DEFAULT_RESCAN_INTERVAL,
            source: DEFAULT_SOURCE_LABEL.to_string(),
        }
    }

    #[must_use]
    pub fn with_paths(mut self, paths: Vec<String>) -> Self {
        self.paths = paths;
        self
    }

    #[must_use]
    pub fn with_patterns(mut self, patterns: Vec<PatternSpec>) -> Self {
        self.patterns = patterns;
        self
    }

    #[must_use]
    pub fn with_clear_policy(mut self, clear: ClearPolicy) -> Self {
        self.clear = clear;
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = clamp_interval("poll_interval", interval);
        self
    }

    #[must_use]
    pub fn with_rescan_interval(mut self, interval: Duration) -> Self {
        self.rescan_interval = clamp_interval("rescan_interval", interval);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Wildcard path patterns, absolute or relative to the workspace root.
    #[must_use]
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    #[must_use]
    pub fn patterns(&self) -> &[PatternSpec] {
        &self.patterns
    }

    #[must_use]
    pub fn clear_policy(&self) -> ClearPolicy {
        self.clear
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    #[must_use]
    pub fn rescan_interval(&self) -> Duration {
        self.rescan_interval
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}
