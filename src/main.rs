//! Twin Matrix service
//!
//! Wraps the signature encoder and on-chain codec in an HTTP API for the
//! identity wizard front-end.
//!
//! ## Endpoints
//!
//! - `POST /api/signature` - Generate (preview) a signature from wizard state
//! - `POST /api/matrix/decode` - Decode 8 hex words into a signature
//! - `PUT /api/matrix/:owner` - Encode and commit via the chain gateway
//! - `GET /api/matrix/:owner` - Read back and decode the committed matrix
//! - `GET /api/permissions/:owner` - Permission mask quadrants
//! - `GET /healthz` - Health check

use anyhow::Context;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use twin_matrix::config::{AppState, Config};
use twin_matrix::handlers::router;
use twin_matrix::registry::{check_registry, writable_dims};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "twin_matrix=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();
    let bind_addr = config.bind_addr();

    let defects = check_registry();
    if !defects.is_empty() {
        anyhow::bail!("Dimension registry is inconsistent: {:?}", defects);
    }

    info!("Starting Twin Matrix service");
    info!("Writable dimensions: {}", writable_dims().len());
    info!("Gateway: {}", config.gateway_mode.as_str());
    info!("Binding to: {}", bind_addr);

    // Create shared state
    let state = AppState::new(config).context("Failed to build application state")?;

    let app = router(state)
        // Add CORS support
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        // Add request tracing
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;

    info!("Server listening on {}", bind_addr);

    axum::serve(listener, app)
        .await
        .context("Server failed")?;

    Ok(())
}
