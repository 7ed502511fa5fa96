//! # colframe
//!
//! Turns tabular query results into bytes and back.
//!
//! - [stream]: a self-framing wire format (`[chunk_type][len u32 LE][payload]`)
//!   that carries one schema chunk followed by one chunk per [Batch]. Chunks can
//!   be emitted as they are produced with [for_each_chunk] or [StreamWriter].
//! - [file]: persists a [Table] either in the wire format or in a compressed
//!   row-group layout, and reads the first `n` rows of either back with
//!   [read_bounded] without decoding more row groups than needed.
//! - [query]: the seam to a SQL engine. [respond] runs a statement through a
//!   caller supplied [QueryExecutor] and encodes the result.
//!
//! ## Data model
//!
//! A [Table] is a [Schema] plus an ordered list of [Batch]es. Every batch holds
//! one nullable [Column] per field, all of the same length.
//!
//! ## Compress
//!
//! Row-group files deflate a column chunk once its encoded size reaches
//! [CompressConfig::threshold] (256 bytes by default) at
//! [CompressConfig::level] (0 to 9, default 6). [CompressConfig::from_method]
//! accepts `"fast"`, `"best"` or `"default"`, equivalent to levels 1, 9 and 6.
//!
//! ## Logging
//!
//! Reads and writes emit [tracing] events: `debug` once per operation and
//! `trace` per chunk or row group.

mod err;
pub use err::{ColumnarError, ErrorKind};
mod codec;
mod schema;
pub use schema::{DataType, Field, Schema, SchemaRef};
mod column;
pub use column::Column;
mod batch;
pub use batch::Batch;
mod table;
pub use table::Table;
mod strategy;
mod compress;
pub use compress::CompressConfig;
mod cancel;
pub use cancel::CancelToken;
pub mod stream;
pub use stream::{decode, encode, encode_to, for_each_chunk, StreamReader, StreamWriter};
pub mod file;
pub use file::{
    read_bounded, write, write_with_cancel, BoundedReader, ColumnStats, FileFormat, FileMetadata,
    ReadStats, RowLimit, ScalarValue, WriteOptions,
};
pub mod query;
pub use query::{respond, respond_to, QueryExecutor};

pub use postcard::Error as PostcardError;
