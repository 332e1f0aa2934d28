//! Mock document store for unit testing.
//!
//! This module provides an in-memory [`DocumentSource`] that can be used in
//! tests without a running database.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mongodb::bson::Document;

use crate::error::StoreError;

use super::document::DocumentSource;

/// Configuration for mock store behavior.
#[derive(Debug, Clone, Default)]
pub struct MockStoreConfig {
    /// Fail every query as if the server could not be reached.
    pub fail_unavailable: bool,
    /// Fail every query as if the driver rejected it.
    pub fail_query: bool,
    /// Simulated latency in milliseconds.
    pub latency_ms: u64,
}

/// Mock document store for testing.
#[derive(Debug, Clone, Default)]
pub struct MockDocumentStore {
    /// Mock configuration.
    config: MockStoreConfig,
    /// Documents keyed by `database.collection`.
    collections: Arc<Mutex<HashMap<String, Vec<Document>>>>,
}

impl MockDocumentStore {
    /// Create an empty mock store with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock store with custom configuration.
    pub fn with_config(config: MockStoreConfig) -> Self {
        Self {
            config,
            collections: Arc::default(),
        }
    }

    /// Replace the documents of one collection.
    pub fn set_documents(&self, database: &str, collection: &str, documents: Vec<Document>) {
        let mut collections = self
            .collections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        collections.insert(key(database, collection), documents);
    }

    /// Clear all mock data.
    pub fn clear(&self) {
        self.collections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

fn key(database: &str, collection: &str) -> String {
    format!("{}.{}", database, collection)
}

#[async_trait]
impl DocumentSource for MockDocumentStore {
    async fn find_all(&self, database: &str, collection: &str) -> Result<Vec<Document>, StoreError> {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.config.latency_ms)).await;
        }

        if self.config.fail_unavailable {
            return Err(StoreError::Unavailable {
                reason: "Mock server selection timeout".to_string(),
            });
        }

        if self.config.fail_query {
            return Err(StoreError::QueryFailed {
                collection: collection.to_string(),
                reason: "Mock query failure".to_string(),
            });
        }

        let collections = self
            .collections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(collections
            .get(&key(database, collection))
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[tokio::test]
    async fn mock_store_returns_documents_in_order() {
        let store = MockDocumentStore::new();
        store.set_documents(
            "pascal",
            "markets",
            vec![doc! { "id": 2 }, doc! { "id": 1 }],
        );

        let documents = store.find_all("pascal", "markets").await.unwrap();

        assert_eq!(documents, vec![doc! { "id": 2 }, doc! { "id": 1 }]);
    }

    #[tokio::test]
    async fn unknown_collection_is_empty() {
        let store = MockDocumentStore::new();
        assert!(store.find_all("pascal", "events").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn mock_store_injects_failures() {
        let unavailable = MockDocumentStore::with_config(MockStoreConfig {
            fail_unavailable: true,
            ..Default::default()
        });
        assert!(unavailable
            .find_all("pascal", "markets")
            .await
            .unwrap_err()
            .is_unavailable());

        let failing = MockDocumentStore::with_config(MockStoreConfig {
            fail_query: true,
            ..Default::default()
        });
        assert!(matches!(
            failing.find_all("pascal", "markets").await,
            Err(StoreError::QueryFailed { .. })
        ));
    }

    #[tokio::test]
    async fn clear_removes_documents() {
        let store = MockDocumentStore::new();
        store.set_documents("pascal", "markets", vec![doc! { "id": 1 }]);
        store.clear();
        assert!(store.find_all("pascal", "markets").await.unwrap().is_empty());
    }
}
