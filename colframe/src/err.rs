use std::path::PathBuf;

use postcard::Error as PostcardError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ColumnarError {
    #[error("`{0}` does not exist")]
    NotFound(PathBuf),
    #[error("malformed columnar data: {0}")]
    Format(String),
    #[error("serialize or deserialize error")]
    SerializeError(#[from] PostcardError),
    #[error("`{0}` during rle decoding")]
    RleDecodeError(String),
    #[error("invalid data type tag `{0}`")]
    InvalidDataType(u8),
    #[error("invalid chunk type `{0}`")]
    InvalidChunkType(u8),
    #[error("column `{0}` is not in the schema")]
    ColumnNotFound(String),
    #[error("{0}")]
    SchemaMismatch(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("operation cancelled")]
    Cancelled,
    #[error("query failed: {0}")]
    Query(String),
}

/// Coarse classification of [ColumnarError], stable across variants added later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source path does not exist.
    NotFound,
    /// Malformed or truncated wire bytes or on-disk structure.
    Format,
    /// A projected column is absent from the source schema.
    ColumnNotFound,
    /// The destination or source could not be read or written.
    Io,
    /// An in-memory table or batch was built with inconsistent parts.
    Schema,
    Cancelled,
    Query,
}

impl ColumnarError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ColumnarError::NotFound(_) => ErrorKind::NotFound,
            ColumnarError::Format(_)
            | ColumnarError::SerializeError(_)
            | ColumnarError::RleDecodeError(_)
            | ColumnarError::InvalidDataType(_)
            | ColumnarError::InvalidChunkType(_) => ErrorKind::Format,
            ColumnarError::ColumnNotFound(_) => ErrorKind::ColumnNotFound,
            ColumnarError::SchemaMismatch(_) => ErrorKind::Schema,
            ColumnarError::Io(_) => ErrorKind::Io,
            ColumnarError::Cancelled => ErrorKind::Cancelled,
            ColumnarError::Query(_) => ErrorKind::Query,
        }
    }

    pub(crate) fn format(msg: impl Into<String>) -> Self {
        ColumnarError::Format(msg.into())
    }

    /// Maps an io error hit while reading a columnar source. Running out of
    /// bytes means the source is truncated, which is a format problem.
    pub(crate) fn from_read(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            ColumnarError::Format("unexpected end of input".to_string())
        } else {
            ColumnarError::Io(err)
        }
    }
}
