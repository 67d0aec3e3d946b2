//! Request body builder for form-encoded and JSON payloads.

use serde_json::{Map, Value};

pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";
pub const CONTENT_TYPE_OCTET_STREAM: &str = "application/octet-stream";

/// A request payload: a field mapping tagged with the data kind it serializes
/// to.
///
/// Values are immutable once constructed. Use [`RequestData::form`] for an
/// `application/x-www-form-urlencoded` body and [`RequestData::json`] for a
/// JSON document.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestData {
    /// URL-encoded form body.
    Form(Map<String, Value>),
    /// JSON object body.
    Json(Map<String, Value>),
}

impl RequestData {
    pub fn form(fields: Map<String, Value>) -> Self {
        RequestData::Form(fields)
    }

    pub fn json(fields: Map<String, Value>) -> Self {
        RequestData::Json(fields)
    }

    /// Serialize to `(body, content-type)`.
    pub fn encode(&self) -> (String, &'static str) {
        match self {
            RequestData::Form(fields) => (form_encode(fields), CONTENT_TYPE_FORM),
            RequestData::Json(fields) => {
                (Value::Object(fields.clone()).to_string(), CONTENT_TYPE_JSON)
            }
        }
    }

    /// Serialize an optional payload. An absent payload is treated as an
    /// empty JSON object, never as an error.
    pub(crate) fn encode_opt(data: Option<&RequestData>) -> (String, &'static str) {
        match data {
            Some(data) => data.encode(),
            None => ("{}".to_string(), CONTENT_TYPE_JSON),
        }
    }
}

fn form_encode(fields: &Map<String, Value>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in fields {
        serializer.append_pair(key, &scalar_string(value));
    }
    serializer.finish()
}

/// Stringify a form value. Sequences are joined with commas before encoding,
/// so `[1, 2]` becomes the single value `1,2`.
fn scalar_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(scalar_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}
