use serde::{Deserialize, Serialize};

use crate::executor::types::BatchConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub sink: SinkConfig,

    /// Path of the `.env` file consulted at load time.
    #[serde(skip)]
    pub env_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default = "default_logging_file")]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "rowflow_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_file() -> bool {
    false
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: default_logging_file(),
            level: default_logging_level(),
            directory: None,
        }
    }
}

/// Where the fund list is fetched from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_url")]
    pub url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

pub const DEFAULT_FUNDS_URL: &str = "https://www.blackrock.com/us/individual/product-screener/product-screener-v3.1.jsn?dcrPath=/templatedata/config/product-screener-v3/data/en/one/v4/product-screener-backend-config&userType=individual&siteEntryPassthrough=true";

fn default_source_url() -> String {
    DEFAULT_FUNDS_URL.to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36 Edg/142.0.0.0".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_source_url(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Log each row at debug level; nothing is written.
    #[default]
    Log,
    /// Append each row as a JSON line to `path`.
    Jsonl,
    /// POST each row as JSON to `url`.
    Http,
}

/// Destination of processed rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    #[serde(default)]
    pub kind: SinkKind,

    #[serde(default)]
    pub path: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            kind: SinkKind::default(),
            path: None,
            url: None,
            api_key: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}
