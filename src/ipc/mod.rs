mod error;
mod handlers;
mod helpers;
mod router;
mod stdio;
mod types;

pub use error::{
    Envelope, Failure, Reply, GENERIC_FAILURE, INVALID_ACTION, INVALID_BODY, METHOD_NOT_ALLOWED,
};
pub use router::handle_request;
pub use stdio::serve_lines;
pub use types::{AppState, Request};
