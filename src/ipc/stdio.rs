use std::io::{BufRead, Write};

use super::error::{Envelope, GENERIC_FAILURE, INVALID_BODY};
use super::router::handle_request;
use super::types::{AppState, Request};

/// Line-delimited JSON: one request per input line, one envelope per output
/// line. Returns when the input closes.
pub fn serve_lines<R: BufRead, W: Write>(
    state: &AppState,
    input: R,
    mut output: W,
) -> std::io::Result<()> {
    for line in input.lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let resp = match serde_json::from_str::<Request>(&line) {
            Ok(req) => handle_request(state, &req),
            Err(e) => {
                // No id to echo back.
                tracing::debug!(error = %e, "unparseable request line");
                Envelope::err(None, INVALID_BODY)
            }
        };

        let text = serde_json::to_string(&resp).unwrap_or_else(|_| {
            serde_json::json!({ "success": false, "message": GENERIC_FAILURE, "data": {} })
                .to_string()
        });
        writeln!(output, "{text}")?;
        output.flush()?;
    }
    Ok(())
}
