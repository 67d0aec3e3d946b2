use std::time::Duration;

use crate::client::TlsMode;

/// Options for an HTTP client.
///
/// Passed once at [`Client`](crate::client::Client) construction; the values
/// apply uniformly to every call issued through that client for its entire
/// lifetime.
#[derive(Default)]
pub struct HttpOptions {
    /// `User-Agent` header value
    pub user_agent: Option<String>,
    /// Certificate and hostname verification mode
    pub tls: TlsMode,
    /// Overall per-call timeout
    pub timeout: Option<Duration>,
    /// TCP connect timeout
    pub timeout_connect: Option<Duration>,
}
