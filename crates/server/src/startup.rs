use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::info;

use service::pricing::PricingPolicy;

use crate::errors::StartupError;
use crate::routes::{self, auth};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &configs::ServerConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

/// Connect, migrate when configured, and serve until `shutdown` resolves.
/// In-flight requests are drained before returning.
pub async fn serve<F>(cfg: configs::AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    // DB connection
    let db_cfg = models::db::DatabaseConfig::from_app(&cfg.database);
    let db = models::db::connect_with_config(&db_cfg)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    if cfg.database.run_migrations {
        migration::Migrator::up(&db, None)
            .await
            .map_err(|e| StartupError::Database(format!("migration failed: {e}")))?;
        info!("migrations applied");
    }

    let pricing = PricingPolicy::from(&cfg.pricing);
    let state = auth::ServerState { db: Arc::new(db), auth: auth::ServerAuthConfig::from(&cfg.auth), pricing };

    // Build router
    let cors = build_cors();
    let app: Router = routes::build_router(state, cors);

    // Bind and serve
    let addr = bind_addr(&cfg.server)?;
    info!(%addr, weight_rate = %pricing.weight_rate, "starting laundry server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("laundry server drained");
    Ok(())
}
