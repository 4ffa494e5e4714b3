use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::ipc::{
    self, AppState, Envelope, Request, GENERIC_FAILURE, INVALID_ACTION, INVALID_BODY,
    METHOD_NOT_ALLOWED,
};

/// Maps HTTP method plus `action` onto a dispatch method name.
pub fn method_for(method: &Method, action: &str) -> Result<&'static str, &'static str> {
    match (method.as_str(), action) {
        ("GET", "list") => Ok("records.list"),
        ("GET", "get") => Ok("records.get"),
        ("POST", "create") => Ok("records.create"),
        ("POST", "update") => Ok("records.update"),
        ("DELETE", "delete") => Ok("records.delete"),
        ("GET" | "POST" | "DELETE", _) => Err(INVALID_ACTION),
        _ => Err(METHOD_NOT_ALLOWED),
    }
}

/// Query parameters first, then the JSON body on top for POST.
fn collect_params(
    method: &Method,
    query: HashMap<String, String>,
    body: &Bytes,
) -> Result<Value, &'static str> {
    let mut params: Map<String, Value> = query
        .into_iter()
        .filter(|(k, _)| k != "action")
        .map(|(k, v)| (k, Value::String(v)))
        .collect();

    if *method == Method::POST && !body.iter().all(u8::is_ascii_whitespace) {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => params.extend(fields),
            _ => return Err(INVALID_BODY),
        }
    }
    Ok(Value::Object(params))
}

pub async fn records(
    State(state): State<AppState>,
    method: Method,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::NO_CONTENT.into_response();
    }

    let action = query.get("action").cloned().unwrap_or_default();
    let dispatch = match method_for(&method, &action) {
        Ok(m) => m,
        Err(msg) => return Json(Envelope::err(None, msg)).into_response(),
    };
    let params = match collect_params(&method, query, &body) {
        Ok(p) => p,
        Err(msg) => return Json(Envelope::err(None, msg)).into_response(),
    };

    let req = Request::new(Uuid::new_v4().to_string(), dispatch, params);
    let envelope = tokio::task::spawn_blocking(move || ipc::handle_request(&state, &req))
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = ?e, "dispatch task failed");
            Envelope::err(None, GENERIC_FAILURE)
        });
    Json(envelope.without_id()).into_response()
}
