//! Byte-stream decorators that shape how written data reaches a sink:
//! whole-line delivery ([`LineWriter`]), per-line prefixes
//! ([`PrefixWriter`]) and sinks that can be swapped while being written to
//! ([`ReplaceableWriter`]).

pub mod cliopt;
pub mod error;
pub mod reader;
pub mod rotate;
pub mod runner;
pub mod writer;

pub use error::{Error, Result};
pub use writer::{Close, LineWriter, NopCloser, PrefixWriter, ReplaceableWriter, WriteClose};
