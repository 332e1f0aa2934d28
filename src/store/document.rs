//! MongoDB document store adapter.
//!
//! The adapter borrows a process-wide [`SharedConnection`] for the duration of
//! one query. The connection is established lazily, exactly once, and is shared
//! with any other part of the process holding the same `Arc`.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::error::{Error as DriverError, ErrorKind};
use mongodb::options::ClientOptions;
use mongodb::Client;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

use crate::error::StoreError;
use crate::metrics;

const APP_NAME: &str = "pascal-data";

/// Read access to schema-free document collections.
#[async_trait]
pub trait DocumentSource: Send + Sync + fmt::Debug {
    /// Fetch every document of `database.collection` in store-native order.
    async fn find_all(&self, database: &str, collection: &str) -> Result<Vec<Document>, StoreError>;
}

/// Lazily established client shared across the process.
pub struct SharedConnection {
    uri: String,
    timeout: Duration,
    client: OnceCell<Client>,
    active: Arc<AtomicUsize>,
}

impl fmt::Debug for SharedConnection {
    // The URI may carry credentials.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedConnection")
            .field("timeout", &self.timeout)
            .field("initialized", &self.is_initialized())
            .field("active_leases", &self.active_leases())
            .finish()
    }
}

impl SharedConnection {
    /// Create an uninitialized handle. Nothing is dialed until the first acquire.
    pub fn new(uri: impl Into<String>, timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            uri: uri.into(),
            timeout,
            client: OnceCell::new(),
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Borrow the client, connecting on first use.
    ///
    /// A failed attempt is not cached: the next call dials again.
    pub async fn acquire(&self) -> Result<ConnectionLease, StoreError> {
        let client = self
            .client
            .get_or_try_init(|| self.connect())
            .await?
            .clone();

        self.active.fetch_add(1, Ordering::SeqCst);
        Ok(ConnectionLease {
            client,
            active: Arc::clone(&self.active),
        })
    }

    /// Whether the client has been established.
    pub fn is_initialized(&self) -> bool {
        self.client.initialized()
    }

    /// Number of leases currently held.
    pub fn active_leases(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    async fn connect(&self) -> Result<Client, StoreError> {
        let mut options = ClientOptions::parse(&self.uri)
            .await
            .map_err(|e| StoreError::Unavailable {
                reason: format!("invalid connection string: {}", e),
            })?;
        options.app_name = Some(APP_NAME.to_string());
        options.server_selection_timeout = Some(self.timeout);
        options.connect_timeout = Some(self.timeout);

        let client = Client::with_options(options).map_err(|e| StoreError::Unavailable {
            reason: e.to_string(),
        })?;

        // The driver connects lazily; ping so an unreachable server fails here.
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::Unavailable {
                reason: e.to_string(),
            })?;

        info!("Connected to document store");
        Ok(client)
    }
}

/// A borrowed client. Dropping the lease releases it.
#[derive(Debug)]
pub struct ConnectionLease {
    client: Client,
    active: Arc<AtomicUsize>,
}

impl ConnectionLease {
    /// The borrowed client.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl Drop for ConnectionLease {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// [`DocumentSource`] backed by MongoDB.
#[derive(Debug, Clone)]
pub struct MongoDocumentStore {
    connection: Arc<SharedConnection>,
}

impl MongoDocumentStore {
    /// Create an adapter over a shared connection.
    pub fn new(connection: Arc<SharedConnection>) -> Self {
        Self { connection }
    }

    /// The underlying shared connection.
    pub fn connection(&self) -> &Arc<SharedConnection> {
        &self.connection
    }
}

#[async_trait]
impl DocumentSource for MongoDocumentStore {
    #[instrument(skip(self))]
    async fn find_all(&self, database: &str, collection: &str) -> Result<Vec<Document>, StoreError> {
        let start = Instant::now();
        let lease = self.connection.acquire().await?;

        let result = async {
            let cursor = lease
                .client()
                .database(database)
                .collection::<Document>(collection)
                .find(doc! {})
                .await?;
            cursor.try_collect::<Vec<Document>>().await
        }
        .await;

        metrics::record_store_query_latency(start);

        match result {
            Ok(documents) => {
                debug!(count = documents.len(), "Fetched documents");
                Ok(documents)
            }
            Err(e) => {
                warn!(error = %e, "Document query failed");
                Err(classify_driver_error(&e, collection))
            }
        }
    }
}

/// Map a driver fault onto the store taxonomy.
fn classify_driver_error(err: &DriverError, collection: &str) -> StoreError {
    match err.kind.as_ref() {
        ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) => StoreError::Unavailable {
            reason: err.to_string(),
        },
        _ => StoreError::QueryFailed {
            collection: collection.to_string(),
            reason: err.to_string(),
        },
    }
}
