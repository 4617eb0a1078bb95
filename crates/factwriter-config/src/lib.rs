// factwriter-config - Writer and logging configuration
//
// Supports configuration from multiple sources:
// 1. Environment variables (highest priority, FACTWRITER_* prefix)
// 2. Config file path from FACTWRITER_CONFIG env var
// 3. Config file contents from FACTWRITER_CONFIG_CONTENT env var
// 4. Default config file locations (./factwriter.toml, ./.factwriter.toml)
// 5. Built-in defaults (lowest priority)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod env_overrides;
mod sources;
mod validation;

pub use env_overrides::{EnvSource, ENV_PREFIX};

/// Main runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub writer: WriterConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// Options for one write session
///
/// Validated as a whole by [`WriterConfig::validate`]; the writer refuses to
/// start on an invalid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriterConfig {
    /// Output root; the segment directory is derived from it
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Transactional tables nest data under `Fact/Part0/Segment_<id>`
    #[serde(default = "default_transactional")]
    pub is_transactional_table: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_id: Option<String>,

    /// Top-level primitive columns, in sort precedence
    #[serde(default)]
    pub sort_by: Vec<String>,

    /// Estimated bytes per data file before a new sibling file is started
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: usize,

    #[serde(default = "default_row_group_rows")]
    pub row_group_rows: usize,

    #[serde(default)]
    pub bad_record_action: BadRecordAction,
}

fn default_output_path() -> PathBuf {
    PathBuf::from("./data")
}

fn default_transactional() -> bool {
    true
}

fn default_max_file_bytes() -> usize {
    1024 * 1024 * 1024
}

fn default_row_group_rows() -> usize {
    32 * 1024
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self::new(default_output_path())
    }
}

impl WriterConfig {
    /// Defaults for everything but the output root
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            is_transactional_table: default_transactional(),
            segment_id: None,
            sort_by: Vec::new(),
            max_file_bytes: default_max_file_bytes(),
            row_group_rows: default_row_group_rows(),
            bad_record_action: BadRecordAction::default(),
        }
    }

    pub fn with_sort_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sort_by = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_segment_id(mut self, segment_id: impl Into<String>) -> Self {
        self.segment_id = Some(segment_id.into());
        self
    }

    pub fn with_transactional(mut self, is_transactional_table: bool) -> Self {
        self.is_transactional_table = is_transactional_table;
        self
    }

    pub fn with_max_file_bytes(mut self, max_file_bytes: usize) -> Self {
        self.max_file_bytes = max_file_bytes;
        self
    }

    pub fn with_row_group_rows(mut self, row_group_rows: usize) -> Self {
        self.row_group_rows = row_group_rows;
        self
    }

    pub fn with_bad_record_action(mut self, action: BadRecordAction) -> Self {
        self.bad_record_action = action;
        self
    }

    /// Validate this writer configuration on its own
    pub fn validate(&self) -> Result<()> {
        validation::validate_writer_config(self)
    }
}

/// What to do with a record that does not fit the schema
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadRecordAction {
    /// Return the error and abort the session
    #[default]
    Fail,
    /// Log, count and drop the record
    Skip,
}

impl std::fmt::Display for BadRecordAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BadRecordAction::Fail => write!(f, "fail"),
            BadRecordAction::Skip => write!(f, "skip"),
        }
    }
}

impl std::str::FromStr for BadRecordAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fail" | "abort" => Ok(BadRecordAction::Fail),
            "skip" | "ignore" => Ok(BadRecordAction::Skip),
            _ => anyhow::bail!("Unsupported bad record action: {}. Supported: fail, skip", s),
        }
    }
}

/// Logging configuration for the binary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl RuntimeConfig {
    /// Load configuration from all sources with priority
    pub fn load() -> Result<Self> {
        sources::load_config()
    }

    /// Load configuration from a specific file path (for CLI usage).
    pub fn load_from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        sources::load_from_file_path(path)
    }

    /// Merge another config into this one (used for TOML layering).
    pub fn merge(&mut self, other: RuntimeConfig) {
        self.writer = other.writer;
        self.log = other.log;
    }

    /// Apply environment overrides from a custom source.
    pub fn apply_env_overrides_from<E: EnvSource>(&mut self, env: &E) -> Result<()> {
        env_overrides::apply_env_overrides(self, env)
    }

    /// Build a configuration from optional inline TOML plus overrides
    /// supplied by an `EnvSource`, without touching the host.
    pub fn load_with_env<E: EnvSource>(inline_config: Option<&str>, env: &E) -> Result<Self> {
        use anyhow::Context;

        let mut config = RuntimeConfig::default();
        if let Some(inline) = inline_config {
            let file_config: RuntimeConfig =
                toml::from_str(inline).context("Failed to parse inline config content")?;
            config.merge(file_config);
        }

        config.apply_env_overrides_from(env)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}
