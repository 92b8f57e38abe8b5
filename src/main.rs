//! HTTP server for the Payroll Calculation Engine.
//!
//! Environment:
//! - `PAYROLL_CONFIG_DIR`: configuration root (default `./config`)
//! - `PAYROLL_BIND_ADDR`: listen address (default `0.0.0.0:3000`)
//! - `PAYROLL_BATCH_WORKERS`: batch worker threads (default: rayon's thread count)
//! - `RUST_LOG`: log filter (default `info`)

use std::env;
use std::error::Error;

use payroll_engine::api::{AppState, create_router};
use payroll_engine::config::ConfigLoader;
use tracing::info;
use tracing_subscriber::EnvFilter;

struct ServerSettings {
    config_dir: String,
    bind_addr: String,
    batch_workers: Option<usize>,
}

impl ServerSettings {
    fn from_env() -> Result<Self, Box<dyn Error>> {
        let batch_workers = match env::var("PAYROLL_BATCH_WORKERS") {
            Ok(value) => Some(
                value
                    .parse()
                    .map_err(|e| format!("PAYROLL_BATCH_WORKERS '{}': {}", value, e))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            config_dir: env::var("PAYROLL_CONFIG_DIR").unwrap_or_else(|_| "./config".to_string()),
            bind_addr: env::var("PAYROLL_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            batch_workers,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let settings = ServerSettings::from_env()?;

    let registry = ConfigLoader::load(&settings.config_dir)?.into_registry();
    info!(
        config_dir = %settings.config_dir,
        jurisdictions = registry.len(),
        "Configuration loaded"
    );

    let mut state = AppState::new(registry);
    if let Some(workers) = settings.batch_workers {
        state = state.with_batch_workers(workers);
    }

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    info!(bind_addr = %settings.bind_addr, "Payroll engine listening");
    axum::serve(listener, create_router(state)).await?;

    Ok(())
}
