//! Read-only event/market data service for the Pascal prediction market.
//!
//! Event and market collections are served from either a static dataset
//! bundled with the deployment or a live MongoDB collection, behind one
//! read contract. The crate also defines the signing contract every wallet
//! implementation satisfies, plus a mock wallet that always refuses to sign.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`record`]: Entity kinds and record normalization
//! - [`store`]: Static dataset and document store adapters
//! - [`data`]: Data access layer (`list_all`)
//! - [`wallet`]: Wallet signing contract, connected and mock wallets
//! - [`api`]: HTTP API
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod record;
pub mod store;
pub mod utils;
pub mod wallet;

pub use config::Config;
pub use data::DataAccess;
pub use error::{AppError, Result};
pub use record::{EntityKind, Record};
pub use wallet::{MockWallet, Wallet, WalletSigner};
