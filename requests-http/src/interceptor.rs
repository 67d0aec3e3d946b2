//! Request/response logging around every dispatched exchange.
//!
//! Logs method, URL, headers and a bounded preview of the bodies at debug
//! level. Request payloads that are multipart or raw binary are replaced with
//! a placeholder naming the content type; response bodies are only logged in
//! full for JSON, XML and `text/*` content. The response peek buffers a
//! bounded prefix of the body and hands the caller a [`Body`] that replays it
//! ahead of the unread remainder, so logging never consumes the caller's
//! stream. A failed preview degrades to a placeholder string and never aborts
//! the exchange.

use std::io::{Cursor, Read};
use std::time::Duration;

use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, Method, Response};
use log::{debug, error, log_enabled, Level};

use crate::Body;

/// Upper bound on how much of a response body is buffered for the log
/// preview. Anything beyond it stays on the transport stream and is handed
/// to the caller unread.
const PREVIEW_LIMIT: u64 = 64 * 1024;

/// Identifier tying the request and response log lines of one exchange
/// together. Uses the calling thread's name, like the thread column of a
/// conventional log layout.
pub(crate) fn request_id() -> String {
    let current = std::thread::current();
    match current.name() {
        Some(name) => name.to_string(),
        None => format!("{:?}", current.id()),
    }
}

pub(crate) fn log_request(id: &str, method: &Method, uri: &str, headers: &HeaderMap, preview: &str) {
    if !log_enabled!(Level::Debug) {
        return;
    }
    debug!("---> {} : Request  Method : {} {}", id, method, uri);
    debug!(
        "---> {} : Request  Header : {}",
        id,
        format_value(&format_headers(headers))
    );
    debug!("---> {} : Request  Body   : {}", id, format_value(preview));
}

pub(crate) fn log_failure(id: &str, err: &ureq::Error) {
    error!("<--- {} : HTTP request failed: {}", id, err);
}

/// Log the response and convert its body for the caller.
///
/// When debug logging is enabled and the content type is previewable, a
/// bounded prefix of the body is read for the log line and the returned
/// [`Body`] replays that prefix ahead of the unread remainder, so the caller
/// still sees the full stream. Otherwise the body passes through untouched.
pub(crate) fn log_response(
    id: &str,
    response: Response<ureq::Body>,
    elapsed: Duration,
) -> Response<Body> {
    let (parts, mut body) = response.into_parts();

    if !log_enabled!(Level::Debug) {
        return Response::from_parts(parts, Body::streamed(Box::new(body.into_reader())));
    }

    let content_length = parts
        .headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);
    debug!(
        "<--- {} : Response Code   : {} {} ({} ms, {} bytes)",
        id,
        parts.status.as_u16(),
        parts.status.canonical_reason().unwrap_or(""),
        elapsed.as_millis(),
        content_length
    );
    debug!(
        "<--- {} : Response Header : {}",
        id,
        format_value(&format_headers(&parts.headers))
    );

    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !previewable_response(&content_type) {
        debug!(
            "<--- {} : Response Body   : Ignore Content-Type: {}",
            id, content_type
        );
        return Response::from_parts(parts, Body::streamed(Box::new(body.into_reader())));
    }

    let mut reader = body.into_reader();
    let mut prefix = Vec::new();
    match (&mut reader).take(PREVIEW_LIMIT).read_to_end(&mut prefix) {
        Ok(_) => {
            let mut preview = String::from_utf8_lossy(&prefix).into_owned();
            if prefix.len() as u64 == PREVIEW_LIMIT {
                preview.push_str(" ...");
            }
            debug!("<--- {} : Response Body   : {}", id, format_value(&preview));
        }
        Err(err) => {
            // Best effort only; the exchange goes on with whatever the
            // caller can still read.
            debug!(
                "<--- {} : Response Body   : Failed to read response body: {}",
                id, err
            );
        }
    }

    // hand the caller the buffered prefix followed by the unread remainder
    Response::from_parts(
        parts,
        Body::streamed(Box::new(Cursor::new(prefix).chain(reader))),
    )
}

/// Preview text for an outgoing payload. Multipart and raw binary payloads
/// are never logged in full.
pub(crate) fn request_preview<'a>(content_type: &str, body: Option<&'a str>) -> std::borrow::Cow<'a, str> {
    if content_type.starts_with("multipart/form-data")
        || content_type.starts_with("application/octet-stream")
    {
        return format!("Ignore Content-Type: {}", content_type).into();
    }
    body.unwrap_or("").into()
}

fn previewable_response(content_type: &str) -> bool {
    content_type.starts_with("application/json")
        || content_type.starts_with("application/xml")
        || content_type.starts_with("text/")
}

fn format_headers(headers: &HeaderMap) -> String {
    let mut out = String::new();
    for (name, value) in headers {
        out.push_str(name.as_str());
        out.push_str(": ");
        out.push_str(value.to_str().unwrap_or("<binary>"));
        out.push('\n');
    }
    out
}

/// Reformat multi-line values for log readability: prefix with a newline so
/// the block starts on its own line, and trim trailing newlines.
fn format_value(value: &str) -> String {
    if !value.contains('\n') {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len() + 1);
    out.push('\n');
    out.push_str(value.trim_end_matches('\n'));
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn single_line_values_pass_through() {
        assert_eq!(format_value("abc"), "abc");
        assert_eq!(format_value(""), "");
    }

    #[test]
    fn multi_line_values_get_leading_newline_and_trimmed_tail() {
        assert_eq!(format_value("a: 1\nb: 2\n\n"), "\na: 1\nb: 2");
    }

    #[test]
    fn binary_request_payloads_are_ignored() {
        let preview = request_preview("application/octet-stream", Some("raw"));
        assert_eq!(preview, "Ignore Content-Type: application/octet-stream");

        let preview = request_preview("multipart/form-data; boundary=xyz", None);
        assert_eq!(preview, "Ignore Content-Type: multipart/form-data; boundary=xyz");
    }

    #[test]
    fn text_request_payloads_are_logged() {
        let preview = request_preview("application/json; charset=utf-8", Some("{}"));
        assert_eq!(preview, "{}");
    }

    #[test]
    fn response_preview_gated_on_content_type() {
        assert!(previewable_response("application/json"));
        assert!(previewable_response("application/xml"));
        assert!(previewable_response("text/plain; charset=utf-8"));
        assert!(!previewable_response("application/octet-stream"));
        assert!(!previewable_response("image/png"));
        assert!(!previewable_response(""));
    }
}
