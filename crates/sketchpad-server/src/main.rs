//! Sketchpad Server
//!
//! Stores report sketches behind a small REST API and pushes changes to
//! WebSocket subscribers of each report.
//!
//! ## Protocol
//!
//! Subscribers of `/reports/{report_id}/events` receive JSON text frames:
//! ```json
//! { "type": "created", "sketch": { ... } }
//! { "type": "updated", "sketch": { ... } }
//! { "type": "deleted", "id": "<uuid>", "report_id": "<report>" }
//! ```

mod config;
mod error;
mod events;
mod routes;

use config::ServerConfig;
use routes::AppState;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sketchpad_server=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let store = config.open_store()?;
    let app = routes::router(AppState::new(store));

    info!("Sketchpad server listening on {} ({:?} storage)", config.addr, config.storage);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
