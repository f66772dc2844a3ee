use std::io::{self, Write};

use super::{forward, Close};
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Fresh,
    Started,
}

/// Puts a fixed prefix in front of every line written to the wrapped writer.
///
/// The prefix is emitted at the start of the stream and right after every
/// `\n`, verbatim, so it may itself span several lines. A chunk that ends in
/// the middle of a line does not cause the next chunk to be prefixed.
///
/// Each chunk reaches the wrapped writer as a single `write` call. A chunk
/// it only partly accepts fails with [`Error::ShortWrite`]; the stream then
/// counts as started, so the leading prefix is never written twice.
pub struct PrefixWriter<W> {
    prefix: Vec<u8>,
    inner: W,
    stream: Stream,
}

impl<W: Write> PrefixWriter<W> {
    pub fn new(prefix: impl Into<Vec<u8>>, inner: W) -> Self {
        Self {
            prefix: prefix.into(),
            inner,
            stream: Stream::Fresh,
        }
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    fn prefixed(&self, buf: &[u8]) -> Vec<u8> {
        let newlines = buf.iter().filter(|&&b| b == b'\n').count();
        let mut out = Vec::with_capacity(buf.len() + (newlines + 1) * self.prefix.len());
        if self.stream == Stream::Fresh {
            out.extend_from_slice(&self.prefix);
        }
        for (i, segment) in buf.split(|&b| b == b'\n').enumerate() {
            if i > 0 {
                out.push(b'\n');
                out.extend_from_slice(&self.prefix);
            }
            out.extend_from_slice(segment);
        }
        out
    }
}

impl<W: Write> Write for PrefixWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let out = self.prefixed(buf);
        if let Err(err) = forward(&mut self.inner, &out) {
            if let Some(Error::ShortWrite { written, .. }) = Error::downcast(&err) {
                if *written > 0 {
                    self.stream = Stream::Started;
                }
            }
            return Err(err);
        }
        self.stream = Stream::Started;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write + Close> Close for PrefixWriter<W> {
    fn close(&mut self) -> io::Result<()> {
        self.inner.close()
    }
}
