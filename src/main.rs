use std::env;
use std::sync::Arc;

use medauth::app;
use medauth::services::store::{AccountStore, MemoryAccountStore, PgAccountStore};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("medauth=info"));
    let formatting_layer = BunyanFormattingLayer::new(env!("CARGO_PKG_NAME").into(), std::io::stdout);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let accounts: Arc<dyn AccountStore> = match env::var("DATABASE_URL") {
        Ok(database_url) => {
            let db_pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(&database_url)
                .await?;
            sqlx::migrate!().run(&db_pool).await?;
            info!("Connected to PostgreSQL, migrations applied");
            Arc::new(PgAccountStore::new(db_pool))
        }
        Err(_) => {
            warn!("DATABASE_URL not set, accounts are kept in memory");
            Arc::new(MemoryAccountStore::new())
        }
    };

    let app = app(accounts);

    let addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8090".to_string());
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "Server starting");

    axum::serve(listener, app).await?;
    Ok(())
}
