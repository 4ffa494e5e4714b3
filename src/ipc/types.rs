use std::path::{Path, PathBuf};

use rusqlite::Connection;
use serde::Deserialize;

use crate::db;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    #[serde(default)]
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl Request {
    pub fn new(id: impl Into<String>, method: &str, params: serde_json::Value) -> Self {
        Request {
            id: id.into(),
            method: method.to_string(),
            params,
        }
    }
}

/// Shared by every transport. Holds no connection: each request opens its
/// own and drops it when the handler returns.
#[derive(Debug, Clone)]
pub struct AppState {
    pub data_dir: PathBuf,
}

impl AppState {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        AppState {
            data_dir: data_dir.into(),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        db::db_path(&self.data_dir)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn connect(&self) -> anyhow::Result<Connection> {
        db::connect(&self.db_path())
    }
}
