//! Progress reporting for streamed request bodies.

use std::io::{self, Read};
use std::time::{Duration, Instant};

use log::debug;

/// Observer for cumulative bytes handed to the transport while a request
/// body is written.
///
/// `content_length` is the declared total length, or `-1` when unknown.
/// `done` is `true` exactly once, on the final chunk.
pub trait ProgressListener {
    fn on_progress(&mut self, bytes_written: u64, content_length: i64, done: bool);
}

/// Wraps an outgoing request body so every chunk read by the transport
/// advances a running total and fires the listener.
///
/// Counters are private to the instance; concurrent uploads each get their
/// own reader and do not synchronize with each other.
pub struct ProgressReader<R> {
    inner: R,
    listener: Box<dyn ProgressListener>,
    content_length: i64,
    bytes_written: u64,
    done_sent: bool,
}

impl<R: Read> ProgressReader<R> {
    pub fn new(inner: R, content_length: i64, listener: Box<dyn ProgressListener>) -> Self {
        ProgressReader {
            inner,
            listener,
            content_length,
            bytes_written: 0,
            done_sent: false,
        }
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.bytes_written += n as u64;
            let done = !self.done_sent
                && self.content_length >= 0
                && self.bytes_written == self.content_length as u64;
            if done {
                self.done_sent = true;
            }
            self.listener
                .on_progress(self.bytes_written, self.content_length, done);
        } else if !self.done_sent
            && (self.content_length < 0 || self.bytes_written == self.content_length as u64)
        {
            // EOF closes out unknown-length and empty bodies. A source that
            // ends short of its declared length never reports completion;
            // the length mismatch is the transport's to surface.
            self.done_sent = true;
            self.listener
                .on_progress(self.bytes_written, self.content_length, true);
        }
        Ok(n)
    }
}

/// Default listener logging percentage and throughput at debug level.
///
/// Side effects are throttled to at most once per second of wall-clock time,
/// plus one mandatory final line when the upload completes. Throughput is
/// computed from the bytes written since the previous log line. An unknown
/// content length disables the percentage, nothing else.
pub struct LogProgress {
    prompt: String,
    last_update: Instant,
    last_bytes: u64,
}

impl LogProgress {
    /// `prompt` is prepended to every log line, e.g. a file name.
    pub fn new<S: Into<String>>(prompt: S) -> Self {
        LogProgress {
            prompt: prompt.into(),
            last_update: Instant::now(),
            last_bytes: 0,
        }
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        LogProgress::new("")
    }
}

impl ProgressListener for LogProgress {
    fn on_progress(&mut self, bytes_written: u64, content_length: i64, done: bool) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update);
        if elapsed >= Duration::from_secs(1) || done {
            let percentage = if content_length > 0 {
                format!(
                    "{:.2}%",
                    bytes_written as f64 * 100.0 / content_length as f64
                )
            } else {
                "unknown".to_string()
            };
            let secs = elapsed.as_secs_f64();
            let speed = if secs > 0.0 {
                (bytes_written - self.last_bytes) as f64 / 1024.0 / 1024.0 / secs
            } else {
                0.0
            };
            debug!(
                "{}upload progress: {}, speed: {:.2} MB/s",
                self.prompt, percentage, speed
            );
            self.last_bytes = bytes_written;
            self.last_update = now;
        }
        if done {
            debug!("{}upload complete", self.prompt);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use std::cell::RefCell;
    use std::io::Cursor;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Recorder {
        events: Rc<RefCell<Vec<(u64, i64, bool)>>>,
    }

    impl ProgressListener for Recorder {
        fn on_progress(&mut self, bytes_written: u64, content_length: i64, done: bool) {
            self.events
                .borrow_mut()
                .push((bytes_written, content_length, done));
        }
    }

    fn drain<R: Read>(reader: &mut R, chunk: usize) {
        let mut buf = vec![0u8; chunk];
        while reader.read(&mut buf).unwrap() > 0 {}
    }

    #[test]
    fn progress_is_monotonic_and_completes_once() {
        let recorder = Recorder::default();
        let data = vec![7u8; 10];
        let mut reader = ProgressReader::new(Cursor::new(data), 10, Box::new(recorder.clone()));
        drain(&mut reader, 3);

        let events = recorder.events.borrow();
        assert!(!events.is_empty());
        let mut previous = 0;
        for &(written, total, _) in events.iter() {
            assert!(written >= previous);
            assert!(written <= 10);
            assert_eq!(total, 10);
            previous = written;
        }
        let done_events: Vec<_> = events.iter().filter(|e| e.2).collect();
        assert_eq!(done_events.len(), 1);
        assert_eq!(done_events[0].0, 10);
        assert_eq!(events.last().unwrap(), &(10, 10, true));
    }

    #[test]
    fn unknown_length_completes_at_eof() {
        let recorder = Recorder::default();
        let data = vec![1u8; 5];
        let mut reader = ProgressReader::new(Cursor::new(data), -1, Box::new(recorder.clone()));
        drain(&mut reader, 2);

        let events = recorder.events.borrow();
        let done_events: Vec<_> = events.iter().filter(|e| e.2).collect();
        assert_eq!(done_events.len(), 1);
        assert_eq!(done_events[0], &(5, -1, true));
    }

    #[test]
    fn empty_body_still_reports_completion() {
        let recorder = Recorder::default();
        let mut reader =
            ProgressReader::new(Cursor::new(Vec::new()), 0, Box::new(recorder.clone()));
        drain(&mut reader, 4);

        let events = recorder.events.borrow();
        assert_eq!(events.as_slice(), &[(0, 0, true)]);
    }

    #[test]
    fn short_source_never_reports_completion() {
        let recorder = Recorder::default();
        let data = vec![9u8; 5];
        let mut reader = ProgressReader::new(Cursor::new(data), 10, Box::new(recorder.clone()));
        drain(&mut reader, 2);

        let events = recorder.events.borrow();
        assert!(!events.is_empty());
        assert!(events.iter().all(|event| !event.2));
        assert_eq!(events.last().unwrap(), &(5, 10, false));
    }

    #[test]
    fn unknown_length_does_not_panic_default_listener() {
        let mut listener = LogProgress::default();
        listener.on_progress(1024, -1, false);
        listener.on_progress(2048, -1, true);
    }
}
