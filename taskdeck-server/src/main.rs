//! `Taskdeck` server: JSON task API over a SQLite file.
//!
//! # Usage
//!
//! ```bash
//! # Run on the default address 127.0.0.1:3000
//! cargo run --bin taskdeck-server
//!
//! # Custom address and database
//! cargo run --bin taskdeck-server -- --bind 0.0.0.0:8080 --database ./tasks.db
//!
//! # Or via environment variables
//! TASKDECK_ADDR=0.0.0.0:8080 TASKDECK_DB=./tasks.db cargo run --bin taskdeck-server
//! ```

use std::sync::Arc;

use clap::Parser;
use taskdeck_server::config::{ServerCliArgs, ServerConfig};
use taskdeck_server::routes;
use taskdeck_server::service::TaskService;
use taskdeck_server::store::SqliteStore;

#[tokio::main]
async fn main() {
    let cli = ServerCliArgs::parse();

    let config = match ServerConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(
        addr = %config.bind_addr,
        database = %config.database_path.display(),
        "starting taskdeck server"
    );

    let store = match SqliteStore::open(&config.database_path) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, "failed to open task database");
            std::process::exit(1);
        }
    };
    let service = Arc::new(TaskService::new(store));

    match routes::start_server_with_state(&config.bind_addr, service, config.max_body_size).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "task server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "task server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start task server");
            std::process::exit(1);
        }
    }
}
