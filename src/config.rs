//! Application configuration loaded from environment variables.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::wallet::parse_private_key;

/// Which backing store serves an entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SourceKind {
    /// Bundled static dataset.
    #[default]
    Static,
    /// Live document database.
    Document,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display, Default)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Document Store ===
    /// MongoDB connection string.
    #[serde(default)]
    pub mongodb_uri: Option<String>,

    /// Logical database holding the collections.
    #[serde(default = "default_database_name")]
    pub database_name: String,

    /// Collection holding event documents.
    #[serde(default = "default_events_collection")]
    pub events_collection: String,

    /// Collection holding market documents.
    #[serde(default = "default_markets_collection")]
    pub markets_collection: String,

    /// Server selection / connect timeout in milliseconds.
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,

    // === Source Bindings ===
    /// Store serving `/api/events`.
    #[serde(default)]
    pub events_source: SourceKind,

    /// Store serving `/api/markets`.
    #[serde(default)]
    pub markets_source: SourceKind,

    // === Wallet ===
    /// Optional private key (hex). Without it the default wallet is the mock wallet.
    #[serde(default)]
    pub wallet_private_key: Option<String>,

    // === Server Configuration ===
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_database_name() -> String {
    "pascal".to_string()
}

fn default_events_collection() -> String {
    "events".to_string()
}

fn default_markets_collection() -> String {
    "markets".to_string()
}

fn default_store_timeout_ms() -> u64 {
    5_000
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mongodb_uri: None,
            database_name: default_database_name(),
            events_collection: default_events_collection(),
            markets_collection: default_markets_collection(),
            store_timeout_ms: default_store_timeout_ms(),
            events_source: SourceKind::Static,
            markets_source: SourceKind::Static,
            wallet_private_key: None,
            port: default_port(),
            rust_log: default_log_level(),
            log_format: LogFormat::Text,
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.uses_document_store() && self.mongodb_uri.as_deref().map_or(true, str::is_empty) {
            return Err("MONGODB_URI is required when a source is set to document".to_string());
        }

        if self.database_name.is_empty() {
            return Err("DATABASE_NAME must not be empty".to_string());
        }

        if self.events_collection.is_empty() || self.markets_collection.is_empty() {
            return Err("collection names must not be empty".to_string());
        }

        if self.store_timeout_ms == 0 {
            return Err("STORE_TIMEOUT_MS must be greater than 0".to_string());
        }

        if let Some(key) = &self.wallet_private_key {
            parse_private_key(key).map_err(|e| format!("WALLET_PRIVATE_KEY: {}", e))?;
        }

        Ok(())
    }

    /// Whether any entity is bound to the document store.
    pub fn uses_document_store(&self) -> bool {
        self.events_source == SourceKind::Document || self.markets_source == SourceKind::Document
    }

    /// Store timeout as a duration.
    pub fn store_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.store_timeout_ms)
    }
}
