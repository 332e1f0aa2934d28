//! Pascal market data service entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pascal_data::api::{create_router, AppState};
use pascal_data::config::{Config, LogFormat, SourceKind};
use pascal_data::data::{DataAccess, DocumentBinding};
use pascal_data::metrics;
use pascal_data::record::EntityKind;
use pascal_data::store::{MongoDocumentStore, SharedConnection, StaticStore};
use pascal_data::utils::shutdown_signal;
use pascal_data::wallet::{MockWallet, Wallet, WalletSigner};

/// Pascal prediction market data service.
#[derive(Parser, Debug)]
#[command(name = "pascal-data")]
#[command(about = "Serves event and market data for the Pascal prediction market")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Print a collection through the data access layer.
    List {
        /// Entity kind: events or markets.
        entity: EntityKind,
    },

    /// Generate and print a mock wallet identity.
    MockWallet,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Configuration also picks the log format, so load it before logging
    let config = Config::load();
    let json_logs = matches!(&config, Ok(c) if c.log_format == LogFormat::Json);
    let verbose = args.verbose || matches!(&config, Ok(c) if c.verbose);

    // Initialize logging
    let filter = if verbose {
        EnvFilter::new("pascal_data=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }

    // Handle subcommands
    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(config),
        Some(Command::List { entity }) => cmd_list(config?, entity).await,
        Some(Command::MockWallet) => cmd_mock_wallet(),
        Some(Command::Serve { port }) => cmd_serve(config?, port.or(args.port)).await,
        None => cmd_serve(config?, args.port).await,
    }
}

/// Check configuration validity.
fn cmd_check_config(config: Result<Config, envy::Error>) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("PASCAL DATA - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match config {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    print!("Loading bundled dataset... ");
    match StaticStore::bundled() {
        Ok(store) => {
            println!("OK");
            println!(
                "  Events: {}, Markets: {}",
                store.count(EntityKind::Event),
                store.count(EntityKind::Market)
            );
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Bundled dataset invalid"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Events Source: {}", config.events_source);
    println!("  Markets Source: {}", config.markets_source);
    println!(
        "  Document Store: {}",
        if config.mongodb_uri.is_some() { "Configured" } else { "Not configured" }
    );
    println!("  Database: {}", config.database_name);
    println!(
        "  Collections: {}, {}",
        config.events_collection, config.markets_collection
    );
    println!("  Store Timeout: {}ms", config.store_timeout_ms);
    println!(
        "  Wallet: {}",
        if config.wallet_private_key.is_some() { "Connected (local key)" } else { "Mock (disconnected)" }
    );
    println!("  Port: {}", config.port);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Print a collection as pretty JSON.
async fn cmd_list(config: Config, entity: EntityKind) -> anyhow::Result<()> {
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;

    let data = build_data_access(&config)?;
    let records = data.list_all(entity).await.map_err(|e| {
        error!(entity = %entity, error = %e, "Failed to list records");
        e
    })?;

    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

/// Print a freshly generated mock wallet identity.
fn cmd_mock_wallet() -> anyhow::Result<()> {
    let wallet = MockWallet::new();
    println!("Mock wallet public key: {}", wallet.public_key());
    println!("Signing: disabled (wallet not connected)");
    Ok(())
}

/// Run the HTTP server.
async fn cmd_serve(config: Config, port_override: Option<u16>) -> anyhow::Result<()> {
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    let metrics_handle = metrics::install_recorder()?;

    let data = build_data_access(&config)?;
    let wallet = Wallet::from_config(&config)?;

    info!("Configuration loaded successfully");
    info!("Events source: {}", config.events_source);
    info!("Markets source: {}", config.markets_source);
    if wallet.is_connected() {
        info!("Wallet: connected ({})", wallet.public_key());
    } else {
        warn!("Wallet: mock identity {}, signing disabled", wallet.public_key());
    }

    let state = AppState::new(data, wallet).with_metrics(metrics_handle);

    let port = port_override.unwrap_or(config.port);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    let router = create_router(state.clone());
    state.set_ready(true);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

/// Wire the static dataset and, when configured, the document store.
fn build_data_access(config: &Config) -> anyhow::Result<DataAccess> {
    let static_store = Arc::new(StaticStore::bundled()?.clone());

    let documents = match &config.mongodb_uri {
        Some(uri) if !uri.is_empty() => {
            let connection = SharedConnection::new(uri.clone(), config.store_timeout());
            let store = MongoDocumentStore::new(connection);
            Some(DocumentBinding::from_config(Arc::new(store), config))
        }
        _ => {
            if config.uses_document_store() {
                warn!("A source is set to {} but MONGODB_URI is empty", SourceKind::Document);
            }
            None
        }
    };

    Ok(DataAccess::from_config(config, static_store, documents))
}
