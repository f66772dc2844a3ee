use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The constructor of a replaceable writer has never produced a writer.
    #[error("replaceable writer not constructed")]
    NotConstructed,

    /// Closing the held writer failed while swapping in a new one.
    #[error("close previous writer: {0}")]
    ClosePrevious(#[source] io::Error),

    /// A forwarded line was only partially accepted by the wrapped writer.
    #[error("short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    #[error("{0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            Error::ClosePrevious(err) | Error::Io(err) => err.kind(),
            Error::ShortWrite { .. } => io::ErrorKind::WriteZero,
            Error::NotConstructed => io::ErrorKind::Other,
            Error::Config(_) => io::ErrorKind::InvalidInput,
        }
    }

    /// Recovers a crate error that travelled through an `io::Error`.
    pub fn downcast(err: &io::Error) -> Option<&Error> {
        err.get_ref().and_then(|inner| inner.downcast_ref::<Error>())
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(err) => err,
            err => io::Error::new(err.kind(), err),
        }
    }
}

impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Error::Config(message.into())
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Error::Config(message)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
