//! DevLocate HTTP service.
//!
//! Finds the users nearest to a location and proxies driving routes from an
//! OSRM server.
//!
//! # Endpoints
//!
//! - `GET /api/users/nearby` - K nearest users to `latitude`/`longitude`
//! - `GET /api/osm/route` - Driving route between origin and destination
//! - `GET /api/users/all` - Every loaded user
//! - `GET /api/users/{id}` - A single user
//! - `GET /api/info` - Service information
//! - `GET /metrics` - Prometheus metrics endpoint
//! - `GET /health`, `/health/live`, `/health/ready` - Health probes
//!
//! # Configuration
//!
//! - `SERVICE_PORT` - HTTP port (default: 8000)
//! - `OSRM_BASE_URL` - Routing upstream (default: public OSRM server)
//! - `OSRM_TIMEOUT_SECS` - Upstream timeout (default: 10)
//! - `DEVLOCATE_USERS_PATH` - JSON user dataset (default: built-in users)
//! - `CORS_ALLOW_ANY` - Permissive CORS (default: true)
//! - `METRICS_ENABLED` - Prometheus recorder (default: true)
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: json (default) or text

use std::net::SocketAddr;

use tracing::{error, info};

use devlocate_service::{install_metrics, router};
use devlocate_service_shared::{AppState, LoggingConfig, MetricsConfig, ServiceConfig, init_logging};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(&LoggingConfig::from_env().with_service("devlocate"));

    install_metrics(&MetricsConfig::from_env());

    let config = ServiceConfig::from_env();
    info!(
        port = config.port,
        osrm_base_url = %config.osrm.base_url,
        "starting devlocate service"
    );

    let state = AppState::load(&config).map_err(|e| {
        error!(error = %e, "failed to load application state");
        e
    })?;

    let app = router(state, config.cors_allow_any);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(addr = %addr, "listening on");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
