use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use doc_store::{
    config::{Config, LogFormat, StorageProvider},
    models::{AppState, DocumentLocation},
    routes::create_router,
    storage::{self, MemoryStore, ObjectStore},
    utils::init_logger,
};

/// Serve the document function over plain HTTP.
#[derive(Debug, Parser)]
#[command(name = "doc-store", version, about)]
struct Args {
    /// Address to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(long, short)]
    port: Option<u16>,

    /// Keep the document in memory instead of S3
    #[arg(long)]
    memory: bool,

    /// Initial document content for the in-memory store
    #[arg(long, requires = "memory")]
    seed: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = Config::from_env()?;
    init_logger(config.logging.format.unwrap_or(LogFormat::Pretty));

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.memory {
        config.storage.provider = StorageProvider::Memory;
    }
    info!("Configuration loaded: {:?}", config);

    let location = DocumentLocation::default();
    let store: Arc<dyn ObjectStore> = match args.seed {
        Some(seed) => Arc::new(MemoryStore::with_document(location.clone(), Bytes::from(seed))),
        None => storage::from_config(&config.storage, &location)?,
    };
    info!("Serving document {} from {:?} storage", location, config.storage.provider);

    let app = create_router(AppState::new(store));

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
