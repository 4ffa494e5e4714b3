use crate::db::{Filter, RecordStore, Sort};
use crate::ipc::error::{Failure, Reply};
use crate::ipc::helpers::{param_i64, param_str};
use crate::ipc::types::{AppState, Request};
use crate::paging;
use crate::records::{parse_id, parse_record_input};
use serde_json::json;

pub const INVALID_ID: &str = "Invalid student ID";
pub const NOT_FOUND: &str = "Student not found";
pub const NOT_CHANGED: &str = "No changes made or student not found";

fn require_id(params: &serde_json::Value) -> Result<i64, Failure> {
    parse_id(params.get("id")).ok_or_else(|| Failure::invalid(INVALID_ID))
}

fn handle_list(state: &AppState, params: &serde_json::Value) -> Result<Reply, Failure> {
    let page = paging::clamp_page(param_i64(params, "page"));
    let limit = paging::clamp_page_size(param_i64(params, "limit"));
    let filter = param_str(params, "search").and_then(Filter::new);
    let sort = Sort::from_params(param_str(params, "sort"), param_str(params, "direction"));

    let conn = state.connect()?;
    let store = RecordStore::new(&conn);
    let total = store.count(filter.as_ref())?;
    let pagination = paging::page_info(total, page, limit);
    let records = store.list(filter.as_ref(), sort, limit, pagination.offset)?;

    Ok(Reply::new(
        "Records fetched successfully",
        json!({
            "records": records,
            "pagination": pagination,
        }),
    ))
}

fn handle_get(state: &AppState, params: &serde_json::Value) -> Result<Reply, Failure> {
    let id = require_id(params)?;
    let conn = state.connect()?;
    match RecordStore::new(&conn).get_by_id(id)? {
        Some(record) => Ok(Reply::new("Student found", json!(record))),
        None => Err(Failure::not_found(NOT_FOUND)),
    }
}

fn handle_create(state: &AppState, params: &serde_json::Value) -> Result<Reply, Failure> {
    let fields = parse_record_input(params).map_err(|e| Failure::invalid(e.summary()))?;
    let conn = state.connect()?;
    let id = RecordStore::new(&conn).insert(&fields)?;
    tracing::info!(id, grade = fields.grade.as_str(), "record created");
    Ok(Reply::new(
        "Student record created successfully",
        json!({ "id": id }),
    ))
}

fn handle_update(state: &AppState, params: &serde_json::Value) -> Result<Reply, Failure> {
    let id = require_id(params)?;
    let fields = parse_record_input(params).map_err(|e| Failure::invalid(e.summary()))?;
    let conn = state.connect()?;
    if RecordStore::new(&conn).update(id, &fields)? == 0 {
        return Err(Failure::not_found(NOT_CHANGED));
    }
    tracing::info!(id, grade = fields.grade.as_str(), "record updated");
    Ok(Reply::message("Student record updated successfully"))
}

fn handle_delete(state: &AppState, params: &serde_json::Value) -> Result<Reply, Failure> {
    let id = require_id(params)?;
    let conn = state.connect()?;
    if RecordStore::new(&conn).delete(id)? == 0 {
        return Err(Failure::not_found(NOT_FOUND));
    }
    tracing::info!(id, "record deleted");
    Ok(Reply::message("Student record deleted successfully"))
}

pub fn try_handle(state: &AppState, req: &Request) -> Option<Result<Reply, Failure>> {
    let params = &req.params;
    match req.method.as_str() {
        "records.list" => Some(handle_list(state, params)),
        "records.get" => Some(handle_get(state, params)),
        "records.create" => Some(handle_create(state, params)),
        "records.update" => Some(handle_update(state, params)),
        "records.delete" => Some(handle_delete(state, params)),
        _ => None,
    }
}
