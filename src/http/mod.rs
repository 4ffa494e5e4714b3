pub mod api;
pub mod cors;
pub mod pages;
pub mod probes;

use anyhow::Context;
use axum::middleware::from_fn;
use axum::routing::{any, get};
use axum::Router;
use rusqlite::Connection;

use crate::ipc::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::list))
        .route("/create", get(pages::create_form).post(pages::create_submit))
        .route("/update", get(pages::update_form).post(pages::update_submit))
        .route("/delete", get(pages::delete_confirm).post(pages::delete_submit))
        .route("/records", any(api::records))
        .route("/healthz", get(probes::healthz))
        .route("/livez", get(probes::livez))
        .layer(from_fn(cors::allow_any_origin))
        .with_state(state)
}

pub async fn listen(state: AppState, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    tokio::select! {
        r = axum::serve(listener, build_router(state)) => {
            tracing::warn!("server ended unexpectedly: {:?}", &r)
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received ctrl+c interrupt, closing server");
        }
    }
    Ok(())
}

/// Runs `f` on the blocking pool with a connection opened for this call
/// only. The connection is dropped when `f` returns, on every path.
pub async fn with_conn<T, F>(state: &AppState, f: F) -> anyhow::Result<T>
where
    F: FnOnce(&Connection) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || {
        let conn = state.connect()?;
        f(&conn)
    })
    .await
    .context("blocking task failed")?
}
