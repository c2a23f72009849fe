//!
//! cohort HTTP server
//! ------------------
//! Axum-based HTTP API for study participants.
//!
//! Responsibilities:
//! - Bearer-token authentication and admin/user tier checks (see `extract`).
//! - Participant CRUD plus episode and comment sub-resources (see `routes`).
//! - Uniform `{success, data, message, error}` envelopes for every outcome (see `envelope`).
//! - Startup wiring: store, user directory and token verifier built from `ServerConfig`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use crate::config::ServerConfig;
use crate::identity::{InMemoryDirectory, JwtVerifier, TokenVerifier, UserDirectory};
use crate::service::ResourceService;
use crate::storage::{MemoryStore, SharedStore};

pub mod envelope;
pub mod extract;
pub mod routes;

/// Shared server state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: ResourceService,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    pub fn new(store: SharedStore, directory: Arc<dyn UserDirectory>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { service: ResourceService::new(store, directory), verifier }
    }
}

/// Mount the participant routes on a router bound to `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "cohort ok" }))
        .route("/participants", get(routes::list_participants).post(routes::create_participant))
        .route("/participants/{id}", get(routes::get_participant).delete(routes::delete_participant))
        .route(
            "/participants/{id}/episode",
            post(routes::set_episode).patch(routes::patch_episode).delete(routes::delete_episode),
        )
        .route("/participants/{id}/episodes", post(routes::append_episode))
        .route("/participants/{id}/comment", post(routes::add_comment).get(routes::list_comments))
        .with_state(state)
}

fn load_directory(config: &ServerConfig) -> anyhow::Result<InMemoryDirectory> {
    match &config.users_file {
        Some(path) => {
            let dir = InMemoryDirectory::load_json(path)
                .with_context(|| format!("While loading user profiles from {}", path.display()))?;
            info!(target: "startup", "loaded {} user profiles from {}", dir.len(), path.display());
            Ok(dir)
        }
        None => {
            tracing::warn!(target: "startup", "no user profile file configured; comments cannot be attributed");
            Ok(InMemoryDirectory::new())
        }
    }
}

/// Build state from configuration, bind and serve until Ctrl-C.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    info!(target: "startup", "cohort starting with {:?}", config);
    let directory = load_directory(&config)?;
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        Arc::new(directory),
        Arc::new(JwtVerifier::new(config.jwt_secret())),
    );

    let addr: SocketAddr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind HTTP listener on {}", addr))?;
    info!("Starting server on {}", addr);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
