use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};

use crate::error::{StyleError, StyleResult};
use crate::provider::ProviderTable;

pub mod artists;
pub mod config;
pub mod error;
pub mod generate;
pub mod keys;
pub mod store;

pub use config::ServerConfig;
pub use error::ApiError;
pub use keys::ApiKeyStore;
pub use store::ArtistStore;

pub struct Server {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl Server {
    pub async fn start(config: ServerConfig, providers: ProviderTable) -> StyleResult<Self> {
        let artists = ArtistStore::open(config.artists_file.clone(), config.seed_file.as_deref()).await?;
        let keys = ApiKeyStore::open(config.api_keys_dir.clone()).await?;
        if config.admin_password.is_none() {
            tracing::warn!("ADMIN_PASSWORD is not set; admin endpoints will reject every request");
        }
        let state = Arc::new(ServerState {
            artists,
            keys,
            providers: Arc::new(providers),
            admin_password: config.admin_password.clone(),
            default_model: config.default_model.clone(),
        });

        let listener = TcpListener::bind((config.host.as_str(), config.port))
            .await
            .map_err(|error| StyleError::Internal(format!("failed to bind {}:{}: {error}", config.host, config.port)))?;
        let addr = listener
            .local_addr()
            .map_err(|error| StyleError::Internal(error.to_string()))?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let app = router(state);
        let task = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(error) = result {
                tracing::error!("server stopped with error: {error}");
            }
        });

        tracing::info!("server running on {addr}");
        Ok(Server {
            addr,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn shutdown(&mut self) -> StyleResult<()> {
        if let Some(sender) = self.shutdown.take() {
            sender
                .send(())
                .map_err(|_| StyleError::Internal("failed to send server shutdown signal".to_string()))
        } else {
            Ok(())
        }
    }

    /// Signals shutdown and waits for in-flight requests to drain.
    pub async fn stop(mut self) -> StyleResult<()> {
        self.shutdown()?;
        if let Some(task) = self.task.take() {
            task.await
                .map_err(|error| StyleError::Internal(format!("server task failed: {error}")))?;
        }
        Ok(())
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

fn router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    Router::new()
        .route("/health", get(health))
        .route("/api/artists", get(artists::list).post(artists::upsert))
        .route("/api/artists/bulk", post(artists::bulk))
        .route("/api/artists/clear", post(artists::clear))
        .route(
            "/api/artists/:name",
            get(artists::get_one).delete(artists::remove),
        )
        .route("/api/toggle", post(artists::toggle))
        .route("/api/generate-style", post(generate::generate_style))
        .route("/save-api-key", post(generate::save_api_key))
        .with_state(state)
        .layer(cors)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) struct ServerState {
    pub(crate) artists: ArtistStore,
    pub(crate) keys: ApiKeyStore,
    pub(crate) providers: Arc<ProviderTable>,
    pub(crate) admin_password: Option<String>,
    pub(crate) default_model: String,
}

impl ServerState {
    /// Admin check. With no password configured nothing is authorized.
    pub(crate) fn authorize(&self, password: Option<&str>) -> Result<(), ApiError> {
        match (self.admin_password.as_deref(), password) {
            (Some(expected), Some(given)) if expected == given => Ok(()),
            _ => Err(ApiError::unauthorized()),
        }
    }
}
