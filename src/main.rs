//! HTTP server for the attendance report service.
//!
//! Configuration is read from the directory named by `ATTENDANCE_CONFIG_DIR`
//! (default `./config`). Log verbosity follows `RUST_LOG` (default `info`).

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use attendance_report::aggregation::MemoryStore;
use attendance_report::api::{AppState, create_router};
use attendance_report::config::ConfigLoader;

const CONFIG_DIR_VAR: &str = "ATTENDANCE_CONFIG_DIR";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_dir = std::env::var(CONFIG_DIR_VAR).unwrap_or_else(|_| "./config".to_string());
    let config = ConfigLoader::load(&config_dir)?;

    let store = match config.data_path() {
        Some(path) => MemoryStore::load(path)?,
        None => {
            warn!("No attendance data configured, serving an empty store");
            MemoryStore::default()
        }
    };

    let listen_addr = config.listen_addr().to_string();
    info!(
        config_dir = %config_dir,
        template = %config.template_path().display(),
        output_dir = %config.output_dir().display(),
        employees = store.employees.len(),
        "Starting attendance report server"
    );

    let app = create_router(AppState::new(config, Arc::new(store)));
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    info!(addr = %listen_addr, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}
