use crate::backup;
use crate::ipc::error::{Failure, Reply};
use crate::ipc::helpers::param_path;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_export(state: &AppState, params: &serde_json::Value) -> Result<Reply, Failure> {
    let out_path = param_path(params, "outPath").ok_or_else(|| Failure::invalid("missing outPath"))?;
    let summary = backup::export_bundle(state.data_dir(), &out_path)?;
    Ok(Reply::new(
        "Backup exported",
        json!({
            "bundleFormat": summary.bundle_format,
            "entryCount": summary.entry_count,
            "dbSha256": summary.db_sha256,
        }),
    ))
}

fn handle_import(state: &AppState, params: &serde_json::Value) -> Result<Reply, Failure> {
    let in_path = param_path(params, "inPath").ok_or_else(|| Failure::invalid("missing inPath"))?;
    if !in_path.is_file() {
        return Err(Failure::not_found("backup file not found"));
    }
    let summary = backup::import_bundle(&in_path, state.data_dir())?;
    Ok(Reply::new(
        "Backup imported",
        json!({ "bundleFormatDetected": summary.bundle_format_detected }),
    ))
}

pub fn try_handle(state: &AppState, req: &Request) -> Option<Result<Reply, Failure>> {
    match req.method.as_str() {
        "backup.export" => Some(handle_export(state, &req.params)),
        "backup.import" => Some(handle_import(state, &req.params)),
        _ => None,
    }
}
