//! `multipart/form-data` assembly for file uploads.
//!
//! The file contents are streamed from disk through a chained reader rather
//! than loaded into memory; only the framing around the file part is
//! buffered. The file part always comes first, named `file`, followed by one
//! part per field entry.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::Path;

use crate::request_data::CONTENT_TYPE_OCTET_STREAM;

/// A multipart form with a single file part and optional scalar fields.
pub struct MultipartForm {
    boundary: String,
    head: Vec<u8>,
    file: File,
    file_len: u64,
    tail: Vec<u8>,
}

impl MultipartForm {
    /// Build a form around the file at `path`.
    ///
    /// The part filename defaults to the path's base name unless `filename`
    /// overrides it. Fails before any network activity if the file cannot be
    /// opened.
    pub fn from_file(
        path: &Path,
        filename: Option<&str>,
        fields: &HashMap<String, String>,
    ) -> Result<Self, io::Error> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();

        let filename = match filename {
            Some(name) => name.to_string(),
            None => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "file".to_string()),
        };

        let boundary = make_boundary()?;

        let head = format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
            boundary,
            escape(&filename),
            CONTENT_TYPE_OCTET_STREAM,
        )
        .into_bytes();

        let mut tail = String::from("\r\n");
        for (name, value) in fields {
            tail.push_str(&format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                boundary,
                escape(name),
                value
            ));
        }
        tail.push_str(&format!("--{}--\r\n", boundary));

        Ok(MultipartForm {
            boundary,
            head,
            file,
            file_len,
            tail: tail.into_bytes(),
        })
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Total body length in bytes, declared up front so the transport does
    /// not have to fall back to chunked encoding.
    pub fn content_length(&self) -> u64 {
        self.head.len() as u64 + self.file_len + self.tail.len() as u64
    }

    /// Stream of the serialized form: framing from memory, file from disk.
    pub fn into_reader(self) -> impl Read {
        Cursor::new(self.head)
            .chain(self.file.take(self.file_len))
            .chain(Cursor::new(self.tail))
    }
}

/// Escape characters that would break a `Content-Disposition` quoted value.
fn escape(value: &str) -> String {
    value
        .replace('\r', "%0D")
        .replace('\n', "%0A")
        .replace('"', "%22")
}

fn make_boundary() -> Result<String, io::Error> {
    let mut bytes = [0u8; 16];
    getrandom::getrandom(&mut bytes).map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
    Ok(hex::encode(bytes))
}
