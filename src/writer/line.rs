use std::io::{self, Write};

use super::{forward, Close};

/// Sends only whole lines to the wrapped writer.
///
/// Bytes after the last `\n` of a write are kept until a later write
/// completes the line, or until [`flush`](Write::flush) sends them as they
/// are. Every forwarded line is a single `write` call on the inner writer, so
/// writers that handle one line per call (log shippers, rotated files) never
/// see a line split across calls.
///
/// When forwarding fails, the rest of that write is dropped and the pending
/// fragment is left as it was before the failing line. A line the inner
/// writer only partly accepts fails with [`Error::ShortWrite`], carrying the
/// count of that one call.
///
/// [`Error::ShortWrite`]: crate::Error::ShortWrite
pub struct LineWriter<W> {
    inner: W,
    buf: Vec<u8>,
}

impl<W: Write> LineWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            buf: Vec::new(),
        }
    }

    /// The unterminated fragment waiting for its newline.
    pub fn buffered(&self) -> &[u8] {
        &self.buf
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Returns the wrapped writer. A pending fragment is discarded.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for LineWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut rest = buf;
        while let Some(i) = rest.iter().position(|&b| b == b'\n') {
            let (line, tail) = rest.split_at(i + 1);
            let pending = self.buf.len();
            self.buf.extend_from_slice(line);
            if let Err(err) = forward(&mut self.inner, &self.buf) {
                self.buf.truncate(pending);
                return Err(err);
            }
            self.buf.clear();
            rest = tail;
        }
        self.buf.extend_from_slice(rest);
        Ok(buf.len())
    }

    /// Sends the pending fragment without a trailing newline, even when it is
    /// empty, then flushes the wrapped writer.
    fn flush(&mut self) -> io::Result<()> {
        forward(&mut self.inner, &self.buf)?;
        self.buf.clear();
        self.inner.flush()
    }
}

impl<W: Write + Close> Close for LineWriter<W> {
    fn close(&mut self) -> io::Result<()> {
        self.flush()?;
        self.inner.close()
    }
}
