use super::error::{Envelope, Failure, Reply, INVALID_ACTION};
use super::handlers;
use super::types::{AppState, Request};

pub fn handle_request(state: &AppState, req: &Request) -> Envelope {
    let outcome = dispatch(state, req);
    into_envelope(req, outcome)
}

fn dispatch(state: &AppState, req: &Request) -> Result<Reply, Failure> {
    if let Some(resp) = handlers::core::try_handle(state, req) {
        return resp;
    }
    if let Some(resp) = handlers::records::try_handle(state, req) {
        return resp;
    }
    if let Some(resp) = handlers::backup::try_handle(state, req) {
        return resp;
    }
    Err(Failure::Unsupported(INVALID_ACTION.to_string()))
}

fn into_envelope(req: &Request, outcome: Result<Reply, Failure>) -> Envelope {
    let id = Some(req.id.clone()).filter(|id| !id.is_empty());
    match outcome {
        Ok(reply) => Envelope::ok(id, reply.message, reply.data),
        Err(Failure::Internal(e)) => {
            tracing::error!(request_id = %req.id, method = %req.method, error = ?e, "request failed");
            Envelope::err(id, Failure::Internal(e).public_message())
        }
        Err(f) => {
            tracing::debug!(request_id = %req.id, method = %req.method, reason = %f, "request rejected");
            Envelope::err(id, f.public_message())
        }
    }
}
