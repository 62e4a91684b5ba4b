//! Configuration types for logship.
//!
//! [`Settings::load`] layers, lowest priority first: the embedded defaults,
//! an optional TOML file, `LOGSHIP_`-prefixed environment variables
//! (`LOGSHIP_SINK__INDEX=logs-app`), and explicit overrides from the command
//! line. [`Settings::defaults`] returns the embedded defaults without touching
//! the filesystem or the environment (useful in tests).

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[source]
kind         = "webhdfs"
namenode_url = "http://namenode:9870"
user         = "root"
path         = "/user/logs_tp/access.log"
timeout_ms   = 30000

[sink]
url          = "http://opensearch-node1:9200"
index        = "logs-app-20251121"
refresh      = "immediate"
document_ids = "store"
timeout_ms   = 10000

[retry]
max_attempts       = 3
initial_backoff_ms = 200
max_backoff_ms     = 5000
"#;

const ENV_PREFIX: &str = "LOGSHIP";

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level settings for one ingestion run.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub source: SourceSettings,
    pub sink: SinkSettings,
    pub retry: RetrySettings,
}

/// Which file system the source path lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Webhdfs,
    File,
}

/// `[source]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceSettings {
    pub kind: SourceKind,
    pub namenode_url: String,
    pub user: String,
    pub path: String,
    pub timeout_ms: u64,
}

impl SourceSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// When an indexed document becomes visible to search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshMode {
    /// Refresh the affected shards before acknowledging.
    #[default]
    Immediate,
    /// Wait for the next scheduled refresh before acknowledging.
    WaitFor,
    /// Acknowledge without waiting for visibility.
    None,
}

impl RefreshMode {
    /// Value of the `refresh` query parameter.
    pub fn as_query_value(self) -> &'static str {
        match self {
            RefreshMode::Immediate => "true",
            RefreshMode::WaitFor => "wait_for",
            RefreshMode::None => "false",
        }
    }
}

/// Who picks the id a document is indexed under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentIds {
    /// The store assigns a fresh id; re-running re-indexes everything.
    #[default]
    Store,
    /// Ids derive from (path, line number, line text); re-running overwrites.
    Deterministic,
}

/// `[sink]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SinkSettings {
    pub url: String,
    pub index: String,
    #[serde(default)]
    pub refresh: RefreshMode,
    #[serde(default)]
    pub document_ids: DocumentIds,
    pub timeout_ms: u64,
}

impl SinkSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// `[retry]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    /// Total attempts per document, the first one included.
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

/// Where [`Settings::load`] reads from beyond the embedded defaults.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// TOML file; must exist when given.
    pub file: Option<PathBuf>,
    /// Dotted keys (`sink.index`) with values that win over every other layer.
    pub overrides: Vec<(String, String)>,
}

impl LoadOptions {
    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.push((key.into(), value.into()));
        self
    }
}

impl Settings {
    /// Assemble settings from every layer and validate them.
    pub fn load(options: &LoadOptions) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml));

        if let Some(path) = &options.file {
            builder = builder.add_source(config::File::from(path.as_path()).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        for (key, value) in &options.overrides {
            builder = builder.set_override(key.as_str(), value.as_str())?;
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.path.trim().is_empty() {
            return Err(ConfigError::Invalid("source.path must not be empty".to_string()));
        }
        if self.source.kind == SourceKind::Webhdfs && self.source.namenode_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "source.namenode_url must be set for webhdfs sources".to_string(),
            ));
        }
        if self.sink.url.trim().is_empty() {
            return Err(ConfigError::Invalid("sink.url must not be empty".to_string()));
        }
        let index = &self.sink.index;
        if index.is_empty() || index.chars().any(|c| c.is_ascii_uppercase() || c.is_whitespace()) {
            return Err(ConfigError::Invalid(format!(
                "sink.index {index:?} must be a non-empty lowercase name without spaces"
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid("retry.max_attempts must be at least 1".to_string()));
        }
        if self.retry.max_backoff_ms < self.retry.initial_backoff_ms {
            return Err(ConfigError::Invalid(
                "retry.max_backoff_ms must not be below retry.initial_backoff_ms".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::defaults()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
