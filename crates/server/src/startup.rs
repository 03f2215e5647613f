use std::sync::Arc;

use axum::Router;
use configs::{AppConfig, StoreConfig};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, AppState};
use service::{file::product_store::FileProductStore, product::ProductService, runtime};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire the file-backed store into the product service.
pub fn build_state(store: &StoreConfig) -> AppState {
    let repo = FileProductStore::from_config(store);
    AppState { products: Arc::new(ProductService::new(repo)) }
}

/// Router with state and layers, ready to serve.
pub fn build_app(cfg: &AppConfig) -> Router {
    routes::build_router(build_state(&cfg.store), build_cors())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // no signal handler available; serve until the process is killed
        std::future::pending::<()>().await;
    }
    info!("received Ctrl+C, shutting down");
}

/// Public entry: build the app and run the HTTP server until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    runtime::ensure_store_dir(&cfg.store.path).await?;

    let app = build_app(&cfg);

    let addr = format!("{}:{}", cfg.server.host, cfg.server.port);
    let listener = tokio::net::TcpListener::bind((cfg.server.host.as_str(), cfg.server.port))
        .await
        .map_err(|source| StartupError::Bind { addr: addr.clone(), source })?;
    info!(
        %addr,
        store = %cfg.store.path.display(),
        policy = %cfg.store.failure_policy,
        "server is running on port {}",
        cfg.server.port
    );

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}
