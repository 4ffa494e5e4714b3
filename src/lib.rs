#![forbid(unsafe_code)]

pub mod backup;
pub mod calc;
pub mod conf;
pub mod db;
pub mod http;
pub mod ipc;
pub mod paging;
pub mod records;
