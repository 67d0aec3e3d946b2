//! Blocking TLS capable HTTP client.
//!
//! Contains a lightweight wrapper around [`ureq`] with per-verb convenience
//! operations and an opt-in TLS trust override.

mod sync;
pub use sync::Client;

mod tls;
pub use tls::TlsMode;
