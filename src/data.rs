//! Uniform read access to event and market collections.
//!
//! Each [`EntityKind`] is bound to one backing store. [`DataAccess::list_all`]
//! fetches the whole collection from that store and returns freshly
//! normalized [`Record`]s in store-native order.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::config::{Config, SourceKind};
use crate::error::StoreError;
use crate::metrics;
use crate::record::{EntityKind, Record};
use crate::store::{DocumentSource, StaticStore};

/// Document store location for both entity kinds.
#[derive(Clone)]
pub struct DocumentBinding {
    /// Store adapter.
    pub source: Arc<dyn DocumentSource>,
    /// Logical database name.
    pub database: String,
    /// Collection holding events.
    pub events_collection: String,
    /// Collection holding markets.
    pub markets_collection: String,
}

impl fmt::Debug for DocumentBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentBinding")
            .field("database", &self.database)
            .field("events_collection", &self.events_collection)
            .field("markets_collection", &self.markets_collection)
            .finish_non_exhaustive()
    }
}

impl DocumentBinding {
    /// Bind with the default `pascal` database and per-kind collection names.
    pub fn new(source: Arc<dyn DocumentSource>) -> Self {
        Self {
            source,
            database: "pascal".to_string(),
            events_collection: EntityKind::Event.collection_name().to_string(),
            markets_collection: EntityKind::Market.collection_name().to_string(),
        }
    }

    /// Bind using the names from configuration.
    pub fn from_config(source: Arc<dyn DocumentSource>, config: &Config) -> Self {
        Self {
            source,
            database: config.database_name.clone(),
            events_collection: config.events_collection.clone(),
            markets_collection: config.markets_collection.clone(),
        }
    }

    /// Collection name for a kind.
    pub fn collection(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Event => &self.events_collection,
            EntityKind::Market => &self.markets_collection,
        }
    }
}

/// Read-only access layer over the configured stores.
#[derive(Debug, Clone)]
pub struct DataAccess {
    static_store: Arc<StaticStore>,
    documents: Option<DocumentBinding>,
    events_source: SourceKind,
    markets_source: SourceKind,
}

impl DataAccess {
    /// Serve every kind from the static store.
    pub fn new(static_store: Arc<StaticStore>) -> Self {
        Self {
            static_store,
            documents: None,
            events_source: SourceKind::Static,
            markets_source: SourceKind::Static,
        }
    }

    /// Build from configuration. `documents` is required for any kind bound to
    /// the document store; missing it surfaces as [`StoreError::NotConfigured`].
    pub fn from_config(
        config: &Config,
        static_store: Arc<StaticStore>,
        documents: Option<DocumentBinding>,
    ) -> Self {
        Self {
            static_store,
            documents,
            events_source: config.events_source,
            markets_source: config.markets_source,
        }
    }

    /// Attach a document store.
    pub fn with_documents(mut self, binding: DocumentBinding) -> Self {
        self.documents = Some(binding);
        self
    }

    /// Bind a kind to a source.
    pub fn bind(mut self, kind: EntityKind, source: SourceKind) -> Self {
        match kind {
            EntityKind::Event => self.events_source = source,
            EntityKind::Market => self.markets_source = source,
        }
        self
    }

    /// The source bound to a kind.
    pub fn source_for(&self, kind: EntityKind) -> SourceKind {
        match kind {
            EntityKind::Event => self.events_source,
            EntityKind::Market => self.markets_source,
        }
    }

    /// Whether a document store is attached.
    pub fn has_documents(&self) -> bool {
        self.documents.is_some()
    }

    /// Fetch the full collection for a kind from its bound store.
    #[instrument(skip(self), fields(source = %self.source_for(kind)))]
    pub async fn list_all(&self, kind: EntityKind) -> Result<Vec<Record>, StoreError> {
        let records = match self.source_for(kind) {
            SourceKind::Static => self.static_store.records(kind).to_vec(),
            SourceKind::Document => self.fetch_documents(kind).await?,
        };

        debug!(count = records.len(), "Listed records");
        metrics::record_records_served(kind, records.len());
        Ok(records)
    }

    /// Fetch the full collection for a kind from the document store, whatever
    /// the kind is bound to.
    #[instrument(skip(self))]
    pub async fn list_from_documents(&self, kind: EntityKind) -> Result<Vec<Record>, StoreError> {
        let records = self.fetch_documents(kind).await?;
        metrics::record_records_served(kind, records.len());
        Ok(records)
    }

    async fn fetch_documents(&self, kind: EntityKind) -> Result<Vec<Record>, StoreError> {
        let documents = match &self.documents {
            Some(binding) => {
                binding
                    .source
                    .find_all(&binding.database, binding.collection(kind))
                    .await
            }
            None => Err(StoreError::NotConfigured),
        }
        .inspect_err(|e| metrics::record_store_failure(kind, e))?;

        Ok(documents.into_iter().map(Record::from_document).collect())
    }
}
