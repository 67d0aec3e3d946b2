use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use http::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use http::{Method, Request, Response};

use crate::client::tls;
use crate::interceptor;
use crate::multipart::MultipartForm;
use crate::progress::{LogProgress, ProgressListener, ProgressReader};
use crate::request_data::RequestData;
use crate::{Body, Error, HttpOptions};

/// Blocking HTTP client with per-verb convenience operations.
///
/// The underlying agent is constructed once and reused for every call;
/// connection pooling, keep-alive, TLS handshakes and redirect handling are
/// the agent's responsibility. The client is cheap to share between threads.
pub struct Client {
    agent: ureq::Agent,
}

impl Client {
    pub fn new(options: HttpOptions) -> Self {
        let agent = ureq::Agent::config_builder()
            .tls_config(tls::tls_config(options.tls))
            .user_agent(options.user_agent.as_deref().unwrap_or(concat!(
                "requests-http/",
                env!("CARGO_PKG_VERSION")
            )))
            // the default header set is applied in request_builder; the
            // agent must not inject its own Accept behind it
            .accept(ureq::config::AutoHeaderValue::None)
            .timeout_global(options.timeout)
            .timeout_connect(options.timeout_connect)
            // 4xx/5xx are data for the caller, not transport failures
            .http_status_as_error(false)
            .build()
            .into();

        Self { agent }
    }

    /// A client that accepts any certificate and any hostname, for use
    /// against self-signed endpoints. Independent of, and safe to use next
    /// to, a default verifying client.
    pub fn insecure() -> Self {
        Self::new(HttpOptions {
            tls: tls::TlsMode::Insecure,
            ..HttpOptions::default()
        })
    }

    pub fn get(
        &self,
        url: &str,
        extra_headers: Option<&HashMap<String, String>>,
    ) -> Result<Response<Body>, Error> {
        self.send_empty(Method::GET, url, extra_headers)
    }

    /// [`get`](Self::get), drained to a string with the handle closed.
    pub fn get_string(
        &self,
        url: &str,
        extra_headers: Option<&HashMap<String, String>>,
    ) -> Result<String, Error> {
        self.get(url, extra_headers)?.into_body().read_to_string()
    }

    pub fn head(
        &self,
        url: &str,
        extra_headers: Option<&HashMap<String, String>>,
    ) -> Result<Response<Body>, Error> {
        self.send_empty(Method::HEAD, url, extra_headers)
    }

    pub fn head_string(
        &self,
        url: &str,
        extra_headers: Option<&HashMap<String, String>>,
    ) -> Result<String, Error> {
        self.head(url, extra_headers)?.into_body().read_to_string()
    }

    pub fn post(
        &self,
        url: &str,
        data: Option<&RequestData>,
        extra_headers: Option<&HashMap<String, String>>,
    ) -> Result<Response<Body>, Error> {
        self.send_data(Method::POST, url, data, extra_headers)
    }

    pub fn post_string(
        &self,
        url: &str,
        data: Option<&RequestData>,
        extra_headers: Option<&HashMap<String, String>>,
    ) -> Result<String, Error> {
        self.post(url, data, extra_headers)?
            .into_body()
            .read_to_string()
    }

    pub fn put(
        &self,
        url: &str,
        data: Option<&RequestData>,
        extra_headers: Option<&HashMap<String, String>>,
    ) -> Result<Response<Body>, Error> {
        self.send_data(Method::PUT, url, data, extra_headers)
    }

    pub fn put_string(
        &self,
        url: &str,
        data: Option<&RequestData>,
        extra_headers: Option<&HashMap<String, String>>,
    ) -> Result<String, Error> {
        self.put(url, data, extra_headers)?
            .into_body()
            .read_to_string()
    }

    pub fn patch(
        &self,
        url: &str,
        data: Option<&RequestData>,
        extra_headers: Option<&HashMap<String, String>>,
    ) -> Result<Response<Body>, Error> {
        self.send_data(Method::PATCH, url, data, extra_headers)
    }

    pub fn patch_string(
        &self,
        url: &str,
        data: Option<&RequestData>,
        extra_headers: Option<&HashMap<String, String>>,
    ) -> Result<String, Error> {
        self.patch(url, data, extra_headers)?
            .into_body()
            .read_to_string()
    }

    pub fn delete(
        &self,
        url: &str,
        data: Option<&RequestData>,
        extra_headers: Option<&HashMap<String, String>>,
    ) -> Result<Response<Body>, Error> {
        self.send_data(Method::DELETE, url, data, extra_headers)
    }

    pub fn delete_string(
        &self,
        url: &str,
        data: Option<&RequestData>,
        extra_headers: Option<&HashMap<String, String>>,
    ) -> Result<String, Error> {
        self.delete(url, data, extra_headers)?
            .into_body()
            .read_to_string()
    }

    /// POST a raw byte payload with an explicit content type.
    pub fn post_bytes(
        &self,
        url: &str,
        bytes: &[u8],
        content_type: &str,
        extra_headers: Option<&HashMap<String, String>>,
    ) -> Result<Response<Body>, Error> {
        self.send_bytes(Method::POST, url, bytes, content_type, extra_headers)
    }

    /// PUT a raw byte payload with an explicit content type.
    pub fn put_bytes(
        &self,
        url: &str,
        bytes: &[u8],
        content_type: &str,
        extra_headers: Option<&HashMap<String, String>>,
    ) -> Result<Response<Body>, Error> {
        self.send_bytes(Method::PUT, url, bytes, content_type, extra_headers)
    }

    /// POST the file at `file_path` as a `multipart/form-data` body with one
    /// file part named `file` (streamed from disk) followed by one part per
    /// `fields` entry. Upload progress is logged through a [`LogProgress`]
    /// listener prompted with the upload filename, so concurrent uploads
    /// stay distinguishable in the log.
    ///
    /// The part filename defaults to the file's base name unless `filename`
    /// overrides it. A missing or unreadable file fails before any network
    /// activity.
    pub fn upload(
        &self,
        url: &str,
        file_path: &Path,
        filename: Option<&str>,
        fields: Option<&HashMap<String, String>>,
        extra_headers: Option<&HashMap<String, String>>,
    ) -> Result<Response<Body>, Error> {
        let listener = LogProgress::new(Self::upload_prompt(file_path, filename));
        self.upload_with(url, file_path, filename, fields, extra_headers, Box::new(listener))
    }

    /// [`upload`](Self::upload) with a caller-supplied progress listener.
    pub fn upload_with(
        &self,
        url: &str,
        file_path: &Path,
        filename: Option<&str>,
        fields: Option<&HashMap<String, String>>,
        extra_headers: Option<&HashMap<String, String>>,
        listener: Box<dyn ProgressListener>,
    ) -> Result<Response<Body>, Error> {
        let empty = HashMap::new();
        let form = MultipartForm::from_file(file_path, filename, fields.unwrap_or(&empty))?;

        let content_type = form.content_type();
        let content_length = form.content_length();
        let preview = interceptor::request_preview(&content_type, None).into_owned();
        let reader = ProgressReader::new(form.into_reader(), content_length as i64, listener);

        let request = Self::request_builder(Method::POST, url, extra_headers)
            .header(CONTENT_TYPE, content_type.as_str())
            .header(CONTENT_LENGTH, content_length)
            .body(ureq::SendBody::from_owned_reader(reader))?;

        self.exchange(request, &preview)
    }

    fn send_empty(
        &self,
        method: Method,
        url: &str,
        extra_headers: Option<&HashMap<String, String>>,
    ) -> Result<Response<Body>, Error> {
        let request =
            Self::request_builder(method, url, extra_headers).body(ureq::SendBody::none())?;
        self.exchange(request, "")
    }

    fn send_data(
        &self,
        method: Method,
        url: &str,
        data: Option<&RequestData>,
        extra_headers: Option<&HashMap<String, String>>,
    ) -> Result<Response<Body>, Error> {
        let (body, content_type) = RequestData::encode_opt(data);
        let preview = interceptor::request_preview(content_type, Some(&body)).into_owned();

        let request = Self::request_builder(method, url, extra_headers)
            .header(CONTENT_TYPE, content_type)
            .body(body)?;

        self.exchange(request, &preview)
    }

    fn send_bytes(
        &self,
        method: Method,
        url: &str,
        bytes: &[u8],
        content_type: &str,
        extra_headers: Option<&HashMap<String, String>>,
    ) -> Result<Response<Body>, Error> {
        let preview = interceptor::request_preview(content_type, None).into_owned();

        let request = Self::request_builder(method, url, extra_headers)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)?;

        self.exchange(request, &preview)
    }

    /// Run one exchange with request/response logging around it. Transport
    /// errors are logged and surfaced unmodified.
    fn exchange<T>(&self, request: Request<T>, preview: &str) -> Result<Response<Body>, Error>
    where
        ureq::Agent: RunRequest<T>,
    {
        let id = interceptor::request_id();
        interceptor::log_request(
            &id,
            request.method(),
            &request.uri().to_string(),
            request.headers(),
            preview,
        );

        let start = Instant::now();
        match self.agent.run_request(request) {
            Ok(response) => Ok(interceptor::log_response(&id, response, start.elapsed())),
            Err(err) => {
                interceptor::log_failure(&id, &err);
                Err(Error::Network(err))
            }
        }
    }

    /// Log prompt naming the transfer: the effective part filename.
    fn upload_prompt(file_path: &Path, filename: Option<&str>) -> String {
        let name = match filename {
            Some(name) => name.to_string(),
            None => file_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "file".to_string()),
        };
        format!("{}: ", name)
    }

    /// Stage a request builder with the default header set applied only when
    /// the caller supplies no headers; supplied headers fully replace the
    /// defaults.
    fn request_builder(
        method: Method,
        url: &str,
        extra_headers: Option<&HashMap<String, String>>,
    ) -> http::request::Builder {
        let mut builder = Request::builder().method(method).uri(url);
        match extra_headers {
            None => builder = builder.header(ACCEPT, "*/*"),
            Some(headers) => {
                for (header, value) in headers {
                    builder = builder.header(header.as_str(), value.as_str());
                }
            }
        }
        builder
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(HttpOptions::default())
    }
}

/// Submit helper so [`Client::exchange`] stays monomorphic over the handful
/// of body types the dispatchers build.
trait RunRequest<T> {
    fn run_request(&self, request: Request<T>) -> Result<Response<ureq::Body>, ureq::Error>;
}

impl RunRequest<String> for ureq::Agent {
    fn run_request(&self, request: Request<String>) -> Result<Response<ureq::Body>, ureq::Error> {
        self.run(request)
    }
}

impl<'a> RunRequest<&'a [u8]> for ureq::Agent {
    fn run_request(&self, request: Request<&'a [u8]>) -> Result<Response<ureq::Body>, ureq::Error> {
        self.run(request)
    }
}

impl<'a> RunRequest<ureq::SendBody<'a>> for ureq::Agent {
    fn run_request(
        &self,
        request: Request<ureq::SendBody<'a>>,
    ) -> Result<Response<ureq::Body>, ureq::Error> {
        self.run(request)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_headers_applied_when_none_supplied() {
        let request = Client::request_builder(Method::GET, "http://example.com/", None)
            .body(())
            .unwrap();
        assert_eq!(request.headers().get(ACCEPT).unwrap(), "*/*");
    }

    #[test]
    fn supplied_headers_replace_the_default_set() {
        let mut headers = HashMap::new();
        headers.insert("X-Custom".to_string(), "1".to_string());

        let request = Client::request_builder(Method::GET, "http://example.com/", Some(&headers))
            .body(())
            .unwrap();
        assert!(request.headers().get(ACCEPT).is_none());
        assert_eq!(request.headers().get("X-Custom").unwrap(), "1");
    }

    #[test]
    fn malformed_url_fails_before_dispatch() {
        let client = Client::default();
        match client.get("not a url", None) {
            Err(Error::Protocol(_)) => (),
            other => panic!("expected protocol error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn upload_prompt_names_the_transfer() {
        let path = std::path::Path::new("/tmp/report.csv");
        assert_eq!(Client::upload_prompt(path, None), "report.csv: ");
        assert_eq!(Client::upload_prompt(path, Some("data.bin")), "data.bin: ");
    }

    #[test]
    fn insecure_and_verifying_clients_coexist() {
        let _strict = Client::default();
        let _trusting = Client::insecure();
    }
}
