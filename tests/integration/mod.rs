//! Integration tests for the Pascal data service.
//!
//! These tests drive the public API with the mock document store and the
//! mock wallet. Tests marked `#[ignore]` need a live MongoDB instance:
//! Run with: MONGODB_URI=mongodb://localhost:27017 cargo test --test integration -- --ignored

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use pascal_data::api::{create_router, AppState};
use pascal_data::config::{Config, SourceKind};
use pascal_data::data::{DataAccess, DocumentBinding};
use pascal_data::error::{StoreError, WalletError};
use pascal_data::store::{
    MockDocumentStore, MockStoreConfig, MongoDocumentStore, SharedConnection, StaticStore,
};
use pascal_data::wallet::{
    MockWallet, SignedTransaction, UnsignedTransaction, Wallet, WalletSigner,
};
use pascal_data::EntityKind;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

const TEST_KEY: &str = "0x0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

/// Stand-in for transaction-submission code: only sees the contract.
async fn submit(
    wallet: &dyn WalletSigner,
    batch: &[UnsignedTransaction],
) -> Result<Vec<SignedTransaction>, WalletError> {
    wallet.sign_all_transactions(batch).await
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

fn bundled() -> Arc<StaticStore> {
    Arc::new(StaticStore::bundled().unwrap().clone())
}

#[tokio::test]
async fn bundled_collections_are_served_in_full() {
    let store = bundled();
    let app = create_router(AppState::new(
        DataAccess::new(Arc::clone(&store)),
        MockWallet::new().into_wallet(),
    ));

    let (status, events) = get(app.clone(), "/api/events").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events.as_array().unwrap().len(), store.count(EntityKind::Event));

    let (status, markets) = get(app, "/api/markets").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(markets.as_array().unwrap().len(), store.count(EntityKind::Market));
    assert_eq!(markets[0]["id"], json!(101));
}

#[tokio::test]
async fn config_driven_document_binding_serves_markets() {
    let documents = MockDocumentStore::new();
    documents.set_documents(
        "pascal",
        "markets",
        vec![
            doc! {
                "_id": ObjectId::new(),
                "question": "Will it snow in Lisbon?",
                "closesAt": DateTime::from_millis(1_767_225_600_000),
                "volume": 250_i64,
            },
            doc! { "_id": ObjectId::new(), "question": "Second", "volume": 1.5 },
        ],
    );
    let config = Config {
        markets_source: SourceKind::Document,
        mongodb_uri: Some("mongodb://unused".to_string()),
        ..Config::default()
    };
    let data = DataAccess::from_config(
        &config,
        bundled(),
        Some(DocumentBinding::from_config(Arc::new(documents), &config)),
    );
    let app = create_router(AppState::new(data, MockWallet::new().into_wallet()));

    let (status, markets) = get(app.clone(), "/api/markets").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        markets,
        json!([
            {
                "question": "Will it snow in Lisbon?",
                "closesAt": "2026-01-01T00:00:00Z",
                "volume": 250,
            },
            { "question": "Second", "volume": 1.5 },
        ])
    );

    // Same normalization on the store-backed endpoint.
    let (status, from_store) = get(app.clone(), "/api/markets/db").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(from_store, markets);

    // Events still come from the bundled dataset.
    let (status, events) = get(app, "/api/events").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events[0]["slug"], json!("us-presidential-election-2028"));
}

#[tokio::test]
async fn store_faults_always_produce_a_response() {
    for (config, expected) in [
        (
            MockStoreConfig {
                fail_unavailable: true,
                latency_ms: 10,
                ..Default::default()
            },
            StatusCode::SERVICE_UNAVAILABLE,
        ),
        (
            MockStoreConfig {
                fail_query: true,
                ..Default::default()
            },
            StatusCode::BAD_GATEWAY,
        ),
    ] {
        let data = DataAccess::new(bundled())
            .with_documents(DocumentBinding::new(Arc::new(MockDocumentStore::with_config(
                config,
            ))))
            .bind(EntityKind::Event, SourceKind::Document);
        let app = create_router(AppState::new(data, MockWallet::new().into_wallet()));

        for uri in ["/api/events", "/api/markets/db"] {
            let (status, body) = get(app.clone(), uri).await;
            assert_eq!(status, expected, "{}", uri);
            assert_eq!(body["error"], json!("data unavailable"));
            assert!(body["detail"].as_str().is_some_and(|d| !d.is_empty()));
        }

        // The static binding keeps working.
        let (status, _) = get(app, "/api/markets").await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn rejected_method_body_names_the_method() {
    let app = create_router(AppState::new(
        DataAccess::new(bundled()),
        MockWallet::new().into_wallet(),
    ));

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/markets")
                .body(Body::from(r#"{"question":"new"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"Method POST not allowed");
}

#[tokio::test]
async fn mock_wallet_fails_submission_as_not_connected() {
    let wallet = MockWallet::new();
    let batch = [
        UnsignedTransaction::new(b"t1".to_vec()),
        UnsignedTransaction::new(b"t2".to_vec()),
    ];

    let err = submit(&wallet, &batch).await.unwrap_err();

    assert!(err.is_not_connected());
    assert_eq!(err.to_string(), "wallet not connected");
}

#[tokio::test]
async fn connected_wallet_satisfies_the_same_contract() {
    let wallet = Wallet::connect(TEST_KEY).unwrap();
    let batch = [
        UnsignedTransaction::new(b"t1".to_vec()),
        UnsignedTransaction::new(b"t2".to_vec()),
    ];

    let signed = submit(&wallet, &batch).await.unwrap();

    assert_eq!(signed.len(), 2);
    for tx in &signed {
        assert_eq!(tx.recover_signer().unwrap(), wallet.public_key());
    }
}

#[tokio::test]
async fn concurrent_listings_are_independent() {
    let documents = MockDocumentStore::with_config(MockStoreConfig {
        latency_ms: 5,
        ..Default::default()
    });
    documents.set_documents("pascal", "events", vec![doc! { "id": 1 }, doc! { "id": 2 }]);
    let data = Arc::new(
        DataAccess::new(bundled())
            .with_documents(DocumentBinding::new(Arc::new(documents)))
            .bind(EntityKind::Event, SourceKind::Document),
    );

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let data = Arc::clone(&data);
            let kind = if i % 2 == 0 { EntityKind::Event } else { EntityKind::Market };
            tokio::spawn(async move { (kind, data.list_all(kind).await) })
        })
        .collect();

    for handle in handles {
        let (kind, result) = handle.await.unwrap();
        let records = result.unwrap();
        match kind {
            EntityKind::Event => assert_eq!(records.len(), 2),
            EntityKind::Market => assert_eq!(records.len(), 6),
        }
    }
}

#[tokio::test]
async fn unreachable_store_is_unavailable() {
    // Port 1 on loopback refuses connections.
    let connection = SharedConnection::new(
        "mongodb://127.0.0.1:1/?directConnection=true",
        Duration::from_millis(200),
    );
    let data = DataAccess::new(bundled()).with_documents(DocumentBinding::new(Arc::new(
        MongoDocumentStore::new(Arc::clone(&connection)),
    )));

    let err = data.list_from_documents(EntityKind::Market).await.unwrap_err();

    assert!(matches!(err, StoreError::Unavailable { .. }));
    assert!(!connection.is_initialized());
    assert_eq!(connection.active_leases(), 0);
}

#[tokio::test]
#[ignore = "requires MONGODB_URI"]
async fn live_store_serves_markets_endpoint() {
    let Ok(uri) = std::env::var("MONGODB_URI") else {
        println!("Skipping: MONGODB_URI not set");
        return;
    };

    let connection = SharedConnection::new(uri, Duration::from_secs(5));
    let data = DataAccess::new(bundled()).with_documents(DocumentBinding::new(Arc::new(
        MongoDocumentStore::new(Arc::clone(&connection)),
    )));
    let app = create_router(AppState::new(data, MockWallet::new().into_wallet()));

    let (status, body) = get(app.clone(), "/api/markets/db").await;
    assert_eq!(status, StatusCode::OK);
    let markets = body.as_array().unwrap();
    assert!(markets.iter().all(|m| m.get("_id").is_none()));
    println!("Fetched {} markets", markets.len());

    // Second request reuses the established client.
    let (status, _) = get(app, "/api/markets/db").await;
    assert_eq!(status, StatusCode::OK);
    assert!(connection.is_initialized());
}
