use std::string::FromUtf8Error;

/// Errors surfaced by the client.
///
/// Transport failures are passed through unmodified and are never retried at
/// this layer. Request construction problems are reported before anything is
/// sent.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// DNS, connect, TLS or timeout failure from the underlying transport.
    #[error("network error: {0}")]
    Network(#[from] ureq::Error),

    /// Malformed URL or header value, detected before dispatch.
    #[error("invalid request: {0}")]
    Protocol(#[from] http::Error),

    /// Upload source file could not be read.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Response body requested as a string was not valid UTF-8.
    #[error("response body is not valid utf-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}
