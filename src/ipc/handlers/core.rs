use crate::db::RecordStore;
use crate::ipc::error::{Failure, Reply};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_health(state: &AppState) -> Result<Reply, Failure> {
    let conn = state.connect()?;
    let records = RecordStore::new(&conn).count(None)?;
    Ok(Reply::new(
        "ok",
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "databasePath": state.db_path().to_string_lossy(),
            "records": records,
        }),
    ))
}

pub fn try_handle(state: &AppState, req: &Request) -> Option<Result<Reply, Failure>> {
    match req.method.as_str() {
        "health" => Some(handle_health(state)),
        _ => None,
    }
}
