//! Decorators over `std::io::Write`.
//!
//! Every decorator wraps another writer and they stack freely, e.g.
//! `PrefixWriter -> LineWriter -> ReplaceableWriter -> File`. Releasing
//! resources is a separate capability, [`Close`], so a writer only has to
//! implement what it actually supports. [`NopCloser`] bridges writers that
//! have nothing to release.

use std::fs::File;
use std::io::{self, Write};

use crate::error::Error;

mod line;
mod nop;
mod prefix;
mod replaceable;

pub use line::LineWriter;
pub use nop::NopCloser;
pub use prefix::PrefixWriter;
pub use replaceable::ReplaceableWriter;

/// Releases whatever a writer holds on to.
pub trait Close {
    fn close(&mut self) -> io::Result<()>;
}

/// A writer that can also be closed. Usable as `Box<dyn WriteClose>`.
pub trait WriteClose: Write + Close {}

impl<T: Write + Close + ?Sized> WriteClose for T {}

impl<C: Close + ?Sized> Close for Box<C> {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl<C: Close + ?Sized> Close for &mut C {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

// The descriptor itself is released on drop.
impl Close for File {
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl Close for &File {
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

/// Hands `buf` to `w` in exactly one accepted `write` call. A short write is
/// reported as [`Error::ShortWrite`] with the count that call accepted.
fn forward<W: Write>(w: &mut W, buf: &[u8]) -> io::Result<()> {
    loop {
        match w.write(buf) {
            Ok(n) if n == buf.len() => return Ok(()),
            Ok(n) => {
                return Err(Error::ShortWrite {
                    written: n,
                    expected: buf.len(),
                }
                .into())
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
}
