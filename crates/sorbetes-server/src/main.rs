mod api;
mod middleware;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = sorbetes_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = sorbetes_db::PoolConfig::from_app_config(&config);
    let pool = sorbetes_db::connect_pool(&config.database_url, pool_config).await?;
    sorbetes_db::run_migrations(&pool).await?;

    let gazetteer = match &config.gazetteer_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading gazetteer override");
            sorbetes_geo::GazetteerSet::load_from_path(path)?
        }
        None => sorbetes_geo::GazetteerSet::builtin()?,
    };
    let resolver =
        sorbetes_delivery::PriceResolver::new(Arc::new(sorbetes_geo::Matcher::from_set(gazetteer)));

    let app = build_app(AppState {
        pool,
        resolver,
        resolve_timeout: Duration::from_millis(config.resolve_timeout_ms),
    });

    tracing::info!(addr = %config.bind_addr, env = %config.env, "starting server");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
