use std::sync::Arc;

use anyhow::Context;
use mimalloc::MiMalloc;
use phonebook::config::Config;
use phonebook::store::{ContactStore, MemoryContactStore, PgContactStore};
use phonebook::{build_router, AppState};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn ContactStore>> {
    let Some(database_url) = config.database_url.as_deref() else {
        warn!("DATABASE_URL not set, contacts are kept in memory");
        return Ok(Arc::new(MemoryContactStore::new()));
    };

    let store = PgContactStore::connect(database_url, config.max_connections)
        .await
        .context("connecting to database")?;
    store.migrate().await.context("running migrations")?;
    info!(max_connections = config.max_connections, "connected to database");
    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env().context("reading configuration")?;
    let store = open_store(&config).await?;

    let app_state = AppState::new(store, config.auth_header.clone());
    let app = build_router(app_state);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "server running");

    axum::serve(listener, app).await.context("serving http")?;
    Ok(())
}
