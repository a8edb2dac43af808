//! Banking API server
//!
//! ```text
//! banking_api [--env|-e <name>]     # loads config/<name>.yaml, default "dev"
//! ```

use std::sync::Arc;

use anyhow::Context;

use banking_api::config::AppConfig;
use banking_api::db::{Database, schema};
use banking_api::gateway::{self, state::AppState};
use banking_api::logging;
use banking_api::store::{MemoryStore, PgStore};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env)?;
    let _log_guard = logging::init_logging(&config);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "starting banking api in {} mode",
        env
    );

    let state = match &config.postgres {
        Some(pg) => {
            let db = Database::connect(pg)
                .await
                .context("failed to connect to PostgreSQL")?;
            schema::init_schema(db.pool())
                .await
                .context("failed to initialize schema")?;
            tracing::info!("using PostgreSQL ledger store");

            let store = Arc::new(PgStore::new(db.pool().clone()));
            AppState::from_store(store, &config).with_database(Arc::new(db))
        }
        None => {
            tracing::warn!("no postgres configured: using in-memory store, data is not persisted");
            AppState::from_store(Arc::new(MemoryStore::new()), &config)
        }
    };

    gateway::run_server(&config.gateway, Arc::new(state)).await
}
