use std::fmt;
use std::io::{self, Cursor, Read};

use crate::Error;

/// Response body supporting either a "full" body buffered in memory or a
/// "streaming" body read lazily off the transport.
///
/// A body must be fully consumed or [closed](Body::close) before the handle
/// is discarded, otherwise the underlying connection is not returned to the
/// transport's pool in a reusable state.
pub struct Body {
    inner: InnerBody,
}

enum InnerBody {
    Full(Cursor<Vec<u8>>),
    Streaming(Box<dyn Read>),
}

impl Body {
    /// An empty body.
    pub fn empty() -> Self {
        Body::buffered(Vec::new())
    }

    /// A body with its full contents already in memory.
    pub fn buffered(data: Vec<u8>) -> Self {
        Body {
            inner: InnerBody::Full(Cursor::new(data)),
        }
    }

    /// A body read lazily from the transport.
    pub fn streamed(reader: Box<dyn Read>) -> Self {
        Body {
            inner: InnerBody::Streaming(reader),
        }
    }

    /// Returns the body contents if it is a "full" body, `None` otherwise.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.inner {
            InnerBody::Full(cursor) => Some(cursor.get_ref()),
            InnerBody::Streaming(_) => None,
        }
    }

    /// Drain the body to its end and return the contents as bytes.
    pub fn read_to_vec(mut self) -> Result<Vec<u8>, Error> {
        match self.inner {
            InnerBody::Full(cursor) => Ok(cursor.into_inner()),
            InnerBody::Streaming(ref mut reader) => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf)?;
                Ok(buf)
            }
        }
    }

    /// Drain the body to its end and return the contents as a string.
    ///
    /// An empty body yields the empty string.
    pub fn read_to_string(self) -> Result<String, Error> {
        Ok(String::from_utf8(self.read_to_vec()?)?)
    }

    /// Turn the body into a plain [`Read`] stream.
    pub fn into_reader(self) -> Box<dyn Read> {
        match self.inner {
            InnerBody::Full(cursor) => Box::new(cursor),
            InnerBody::Streaming(reader) => reader,
        }
    }

    /// Discard the remainder of the body so the pooled connection can be
    /// reused. Read failures while draining are ignored.
    pub fn close(mut self) {
        let _ = io::copy(&mut self, &mut io::sink());
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.inner {
            InnerBody::Full(cursor) => f
                .debug_struct("Body")
                .field("buffered", &cursor.get_ref().len())
                .finish(),
            InnerBody::Streaming(_) => f.debug_struct("Body").field("streaming", &true).finish(),
        }
    }
}

impl Read for Body {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.inner {
            InnerBody::Full(cursor) => cursor.read(buf),
            InnerBody::Streaming(reader) => reader.read(buf),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn buffered_body_reads_back() {
        let body = Body::buffered(b"hello".to_vec());
        assert_eq!(body.as_bytes(), Some(&b"hello"[..]));
        assert_eq!(body.read_to_string().unwrap(), "hello");
    }

    #[test]
    fn empty_body_is_empty_string() {
        assert_eq!(Body::empty().read_to_string().unwrap(), "");
    }

    #[test]
    fn streamed_body_drains() {
        let body = Body::streamed(Box::new(Cursor::new(b"stream".to_vec())));
        assert_eq!(body.as_bytes(), None);
        assert_eq!(body.read_to_vec().unwrap(), b"stream");
    }

    #[test]
    fn debug_does_not_touch_the_stream() {
        assert_eq!(
            format!("{:?}", Body::buffered(b"abc".to_vec())),
            "Body { buffered: 3 }"
        );
        let body = Body::streamed(Box::new(Cursor::new(b"xyz".to_vec())));
        assert_eq!(format!("{:?}", body), "Body { streaming: true }");
        assert_eq!(body.read_to_string().unwrap(), "xyz");
    }

    #[test]
    fn invalid_utf8_reports_error() {
        let body = Body::buffered(vec![0xff, 0xfe]);
        assert!(matches!(body.read_to_string(), Err(Error::Utf8(_))));
    }
}
