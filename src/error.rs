//! Unified error types for the data service.

use thiserror::Error;

/// Unified error type for the data service.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Document store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Bundled dataset error.
    #[error("data error: {0}")]
    Data(#[from] DataError),

    /// Wallet error.
    #[error("wallet error: {0}")]
    Wallet(#[from] WalletError),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Document store errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store connection could not be obtained.
    #[error("document store unavailable: {reason}")]
    Unavailable {
        /// Reason reported by the driver.
        reason: String,
    },

    /// The store rejected or failed a query.
    #[error("query on {collection} failed: {reason}")]
    QueryFailed {
        /// Collection the query ran against.
        collection: String,
        /// Reason reported by the driver.
        reason: String,
    },

    /// No document store is configured for this process.
    #[error("no document store configured")]
    NotConfigured,
}

impl StoreError {
    /// Whether the fault happened before any query reached the store.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. } | StoreError::NotConfigured)
    }
}

/// Bundled dataset errors.
#[derive(Error, Debug)]
pub enum DataError {
    /// A bundled dataset is not valid JSON.
    #[error("failed to parse bundled {dataset} dataset: {source}")]
    Parse {
        /// Dataset name.
        dataset: &'static str,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A bundled record is not a JSON object.
    #[error("record {index} of bundled {dataset} dataset is not an object")]
    NotAnObject {
        /// Dataset name.
        dataset: &'static str,
        /// Position of the offending record.
        index: usize,
    },
}

/// Wallet signing errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// The wallet has no usable signer.
    #[error("wallet not connected")]
    NotConnected,

    /// The private key could not be parsed.
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    /// The signer failed to produce a signature.
    #[error("signing failed: {0}")]
    SigningFailed(String),
}

impl WalletError {
    /// Whether the failure is the expected "no working wallet" outcome.
    pub fn is_not_connected(&self) -> bool {
        matches!(self, WalletError::NotConnected)
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
