//! Error results that can be returned from the parser and tokenizer
use thiserror::Error;

/// Parse error that defines a recovered error (message) on the given byte offset
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    /// Parse error message
    pub message: String,
    /// Byte offset into the input where the error was noticed
    pub offset: usize,
}

/// Serious errors and errors from third-party libraries
#[derive(Debug, Error)]
pub enum Error {
    /// Normal end of input. The tokenizer reports this through its terminal
    /// Error token; it is not a failure.
    #[error("end of input")]
    Eof,

    /// A single token outgrew the configured maximum buffer size
    #[error("buffer limit exceeded")]
    BufferExceeded,

    /// The underlying reader repeatedly returned zero bytes without an error
    #[error("reader made no progress")]
    NoProgress,

    /// A fragment context node whose atom disagrees with its name
    #[error("inconsistent node: atom={atom:?}, data={data:?}")]
    InconsistentNode { atom: crate::atom::Atom, data: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("utf8 conversion error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl Error {
    /// Returns true when this is the normal end-of-input marker.
    pub fn is_eof(&self) -> bool {
        matches!(self, Error::Eof)
    }
}

/// Result that can be returned from the parser and tokenizer
pub type Result<T> = std::result::Result<T, Error>;
