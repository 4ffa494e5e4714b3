use axum::extract::State;
use axum::http::StatusCode;

use super::with_conn;
use crate::ipc::AppState;

pub async fn livez() -> StatusCode {
    tracing::debug!("service is live");
    StatusCode::OK
}

pub async fn healthz(State(state): State<AppState>) -> StatusCode {
    let probe = with_conn(&state, |conn| {
        conn.query_row("SELECT 1", [], |r| r.get::<_, i64>(0))?;
        Ok(())
    })
    .await;
    match probe {
        Ok(()) => {
            tracing::debug!("service is healthy");
            StatusCode::OK
        }
        Err(e) => {
            tracing::error!(error = ?e, "health probe failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
