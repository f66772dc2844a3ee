use std::io::{self, Write};

use super::Close;

/// Gives a writer that holds nothing to release a [`Close`] that always
/// succeeds.
#[derive(Debug, Default)]
pub struct NopCloser<W>(W);

impl<W> NopCloser<W> {
    pub fn new(inner: W) -> Self {
        Self(inner)
    }

    pub fn get_ref(&self) -> &W {
        &self.0
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.0
    }

    pub fn into_inner(self) -> W {
        self.0
    }
}

impl<W: Write> Write for NopCloser<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<W> Write for &NopCloser<W>
where
    for<'a> &'a W: Write,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&self.0).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (&self.0).flush()
    }
}

impl<W> Close for NopCloser<W> {
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<W> Close for &NopCloser<W> {
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}
