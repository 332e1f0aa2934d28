//! Backing stores for event and market records.
//!
//! This module handles:
//! - The static dataset bundled with the deployment
//! - The MongoDB document store adapter and its shared connection
//! - Mock document store for testing

pub mod document;
pub mod mock;
pub mod static_store;

pub use document::{ConnectionLease, DocumentSource, MongoDocumentStore, SharedConnection};
pub use mock::{MockDocumentStore, MockStoreConfig};
pub use static_store::StaticStore;
