//! HTTP API handlers.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use tracing::{error, warn};

use crate::config::SourceKind;
use crate::data::DataAccess;
use crate::metrics::{self, LatencyTimer};
use crate::record::{EntityKind, Record};
use crate::wallet::{Wallet, WalletSigner};

use super::error::ApiError;

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Data access layer.
    pub data: Arc<DataAccess>,
    /// Default wallet handed to transaction-submission code.
    pub wallet: Arc<Wallet>,
    /// Whether the service is ready to serve.
    pub ready: Arc<AtomicBool>,
    /// Prometheus handle, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("data", &self.data)
            .field("wallet", &self.wallet)
            .field("ready", &self.is_ready())
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

impl AppState {
    /// Create new app state.
    pub fn new(data: DataAccess, wallet: Wallet) -> Self {
        Self {
            data: Arc::new(data),
            wallet: Arc::new(wallet),
            ready: Arc::new(AtomicBool::new(false)),
            metrics: None,
        }
    }

    /// Expose metrics through `handle`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Set ready state.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Check if ready.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    /// Whether service is ready.
    pub ready: bool,
    /// Store serving events.
    pub events_source: SourceKind,
    /// Store serving markets.
    pub markets_source: SourceKind,
    /// Whether a document store is attached.
    pub document_store: bool,
}

/// Default wallet summary.
#[derive(Debug, Serialize)]
pub struct WalletResponse {
    /// Checksummed key identity.
    pub public_key: String,
    /// Whether signing can succeed.
    pub connected: bool,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Readiness check handler - returns 200 if ready, 503 otherwise.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let is_ready = state.is_ready();

    let response = ReadyResponse {
        ready: is_ready,
        events_source: state.data.source_for(EntityKind::Event),
        markets_source: state.data.source_for(EntityKind::Market),
        document_store: state.data.has_documents(),
    };

    if is_ready {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// `GET /api/events` - every event from the bound store.
pub async fn list_events(
    method: Method,
    State(state): State<AppState>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let _timer = LatencyTimer::http("/api/events");
    require_get(&method)?;
    list(&state, EntityKind::Event).await
}

/// `GET /api/markets` - every market from the bound store.
pub async fn list_markets(
    method: Method,
    State(state): State<AppState>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let _timer = LatencyTimer::http("/api/markets");
    require_get(&method)?;
    list(&state, EntityKind::Market).await
}

/// `GET /api/markets/db` - every market straight from the document store.
pub async fn list_markets_from_store(
    method: Method,
    State(state): State<AppState>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let _timer = LatencyTimer::http("/api/markets/db");
    require_get(&method)?;

    state
        .data
        .list_from_documents(EntityKind::Market)
        .await
        .map(Json)
        .map_err(|e| {
            error!(entity = %EntityKind::Market, error = %e, "Failed to list markets from store");
            ApiError::from(e)
        })
}

/// `GET /api/wallet` - identity and state of the default wallet.
pub async fn wallet(State(state): State<AppState>) -> impl IntoResponse {
    Json(WalletResponse {
        public_key: state.wallet.public_key().to_string(),
        connected: state.wallet.is_connected(),
    })
}

/// `GET /metrics` - Prometheus exposition.
pub async fn render_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed".to_string()),
    }
}

fn require_get(method: &Method) -> Result<(), ApiError> {
    if *method == Method::GET {
        Ok(())
    } else {
        warn!(method = %method, "Rejected request method");
        metrics::record_method_not_allowed();
        Err(ApiError::MethodNotAllowed(method.clone()))
    }
}

async fn list(state: &AppState, kind: EntityKind) -> Result<Json<Vec<Record>>, ApiError> {
    state.data.list_all(kind).await.map(Json).map_err(|e| {
        error!(entity = %kind, error = %e, "Failed to list records");
        ApiError::from(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StaticStore;
    use crate::wallet::MockWallet;

    fn state() -> AppState {
        AppState::new(
            DataAccess::new(Arc::new(StaticStore::default())),
            MockWallet::new().into_wallet(),
        )
    }

    #[test]
    fn app_state_ready_toggle() {
        let state = state();
        assert!(!state.is_ready());

        state.set_ready(true);
        assert!(state.is_ready());

        state.set_ready(false);
        assert!(!state.is_ready());
    }

    #[test]
    fn require_get_accepts_only_get() {
        assert!(require_get(&Method::GET).is_ok());
        for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH, Method::HEAD] {
            assert!(matches!(
                require_get(&method),
                Err(ApiError::MethodNotAllowed(m)) if m == method
            ));
        }
    }
}
