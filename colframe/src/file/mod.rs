//! On-disk tables.
//!
//! Two layouts are supported: [FileFormat::Stream] stores the wire format of
//! [crate::stream] as is, [FileFormat::RowGroups] stores compressed row groups
//! behind a footer so a prefix of rows can be read without decoding the rest.

mod bounded;
mod column_chunk;
mod row_group;

use std::io::BufWriter;
use std::num::NonZeroUsize;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

pub use bounded::{read_bounded, BoundedReader, ReadStats, RowLimit};
pub use column_chunk::{ColumnStats, ScalarValue};
pub use row_group::{ColumnChunkMeta, FileMetadata, RowGroupMeta, RowGroupWriter};

use crate::{
    cancel::CancelToken, compress::CompressConfig, stream::StreamWriter, ColumnarError, Table,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    /// The uncompressed wire format.
    Stream,
    /// Row groups with per-group metadata, optionally deflated.
    #[default]
    RowGroups,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    pub format: FileFormat,
    /// Rows per row group. `None` writes one group per batch.
    pub row_group_size: Option<NonZeroUsize>,
    /// Deflate settings for column chunks, ignored by [FileFormat::Stream].
    pub compress: Option<CompressConfig>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            format: FileFormat::RowGroups,
            row_group_size: None,
            compress: Some(CompressConfig::default()),
        }
    }
}

impl WriteOptions {
    pub fn stream() -> Self {
        Self {
            format: FileFormat::Stream,
            ..Self::default()
        }
    }

    pub fn row_groups(row_group_size: Option<usize>) -> Self {
        Self {
            format: FileFormat::RowGroups,
            row_group_size: row_group_size.and_then(NonZeroUsize::new),
            ..Self::default()
        }
    }

    pub fn with_compress(mut self, compress: Option<CompressConfig>) -> Self {
        self.compress = compress;
        self
    }
}

/// Writes `table` to `path`, replacing any existing file.
///
/// The data goes to a temporary file next to `path` that is renamed into place
/// once complete. On error the temporary file is removed and `path` keeps its
/// previous content, if any.
pub fn write<P: AsRef<Path>>(
    table: &Table,
    path: P,
    options: &WriteOptions,
) -> Result<(), ColumnarError> {
    write_inner(table, path.as_ref(), options, None)
}

/// Like [write], checking `token` before every batch chunk or row group. A
/// cancelled write leaves `path` as it was.
pub fn write_with_cancel<P: AsRef<Path>>(
    table: &Table,
    path: P,
    options: &WriteOptions,
    token: &CancelToken,
) -> Result<(), ColumnarError> {
    write_inner(table, path.as_ref(), options, Some(token))
}

fn write_inner(
    table: &Table,
    path: &Path,
    options: &WriteOptions,
    cancel: Option<&CancelToken>,
) -> Result<(), ColumnarError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let writer = BufWriter::new(tmp.as_file_mut());
        match options.format {
            FileFormat::Stream => {
                let mut chunks = StreamWriter::try_new(writer, table.schema().clone())?;
                if let Some(token) = cancel {
                    chunks = chunks.with_cancel(token.clone());
                }
                for batch in table.batches() {
                    chunks.write_batch(batch)?;
                }
                chunks.finish()?;
            }
            FileFormat::RowGroups => {
                let mut groups = RowGroupWriter::try_new(
                    writer,
                    table.schema().clone(),
                    options.row_group_size,
                    options.compress,
                )?;
                if let Some(token) = cancel {
                    groups = groups.with_cancel(token.clone());
                }
                for batch in table.batches() {
                    groups.write_batch(batch)?;
                }
                groups.finish()?;
            }
        }
    }
    tmp.as_file().sync_all()?;
    let bytes = tmp.as_file().metadata()?.len();
    tmp.persist(path).map_err(|e| ColumnarError::Io(e.error))?;
    debug!(
        path = %path.display(),
        format = ?options.format,
        rows = table.num_rows(),
        batches = table.num_batches(),
        bytes,
        "wrote table"
    );
    Ok(())
}
