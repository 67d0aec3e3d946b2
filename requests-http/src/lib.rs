//! Convenience HTTP client helpers in the style of python's `requests`.
//!
//! Wraps the [`ureq`] transport with GET/POST/PUT/PATCH/DELETE/HEAD
//! operations, form/JSON body building, request/response logging, multipart
//! file upload with progress callbacks, and an opt-in TLS trust override for
//! self-signed endpoints.

pub mod client;
pub use client::{Client, TlsMode};

mod body;
pub use body::Body;

mod error;
pub use error::Error;

mod http_options;
pub use http_options::HttpOptions;

mod interceptor;

pub mod multipart;
pub use multipart::MultipartForm;

pub mod progress;
pub use progress::{LogProgress, ProgressListener, ProgressReader};

mod request_data;
pub use request_data::RequestData;
