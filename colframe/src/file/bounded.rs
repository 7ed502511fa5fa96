use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use super::row_group::{read_metadata, read_row_group, FileMetadata, MAGIC};
use super::FileFormat;
use crate::{
    cancel::CancelToken, stream::ChunkType, stream::StreamReader, Batch, ColumnarError,
    SchemaRef, Table,
};

/// How many rows a bounded read returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLimit {
    /// The first `n` rows in file order, or all of them if the file is shorter.
    First(usize),
    /// Every row of the file.
    All,
}

impl RowLimit {
    fn max_rows(self) -> usize {
        match self {
            RowLimit::First(n) => n,
            RowLimit::All => usize::MAX,
        }
    }
}

/// What a bounded read touched. For stream files every batch read counts as a
/// decoded group and nothing is counted as skipped, since batches after the
/// limit are never located.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    pub groups_decoded: usize,
    pub groups_skipped: usize,
    pub rows: usize,
}

enum Source<R: Read> {
    RowGroups {
        reader: R,
        metadata: FileMetadata,
        schema: SchemaRef,
    },
    Stream(StreamReader<R>),
}

/// A cursor over one columnar file, created for a single bounded read.
///
/// The underlying handle is owned by the cursor and released when it is
/// dropped, whether the read succeeded or not.
pub struct BoundedReader<R: Read> {
    source: Source<R>,
    projection: Option<(Vec<usize>, SchemaRef)>,
    cancel: Option<CancelToken>,
}

impl BoundedReader<BufReader<File>> {
    /// Opens `path` read-only and parses its layout.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ColumnarError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ColumnarError::NotFound(path.to_path_buf())
            } else {
                ColumnarError::Io(e)
            }
        })?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> BoundedReader<R> {
    /// Detects the format from the leading bytes and parses the schema (and the
    /// footer for row-group files).
    pub fn new(mut reader: R) -> Result<Self, ColumnarError> {
        let mut head = [0u8; 4];
        let mut filled = 0;
        while filled < head.len() {
            match reader.read(&mut head[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ColumnarError::Io(e)),
            }
        }
        reader.seek(SeekFrom::Start(0))?;

        let source = if filled == head.len() && &head == MAGIC {
            let metadata = read_metadata(&mut reader)?;
            let schema = Arc::new(metadata.schema.clone());
            Source::RowGroups {
                reader,
                metadata,
                schema,
            }
        } else if filled > 0 && head[0] == ChunkType::Schema as u8 {
            Source::Stream(StreamReader::try_new(reader)?)
        } else {
            return Err(ColumnarError::format("not a columnar file"));
        };
        Ok(Self {
            source,
            projection: None,
            cancel: None,
        })
    }

    pub fn format(&self) -> FileFormat {
        match self.source {
            Source::RowGroups { .. } => FileFormat::RowGroups,
            Source::Stream(_) => FileFormat::Stream,
        }
    }

    /// The schema stored in the file.
    pub fn file_schema(&self) -> &SchemaRef {
        match &self.source {
            Source::RowGroups { schema, .. } => schema,
            Source::Stream(stream) => stream.schema(),
        }
    }

    /// The schema of the tables this cursor returns.
    pub fn schema(&self) -> &SchemaRef {
        match &self.projection {
            Some((_, schema)) => schema,
            None => self.file_schema(),
        }
    }

    /// The footer of a row-group file; stream files have none.
    pub fn metadata(&self) -> Option<&FileMetadata> {
        match &self.source {
            Source::RowGroups { metadata, .. } => Some(metadata),
            Source::Stream(_) => None,
        }
    }

    /// Total rows in the file, when known without reading it.
    pub fn num_rows(&self) -> Option<u64> {
        self.metadata().map(|m| m.num_rows)
    }

    /// Restricts the read to `columns`, kept in file order.
    pub fn project<S: AsRef<str>>(mut self, columns: &[S]) -> Result<Self, ColumnarError> {
        let file_schema = self.file_schema();
        let indices = file_schema.projection_indices(columns)?;
        let schema = Arc::new(file_schema.project(&indices));
        self.projection = Some((indices, schema));
        Ok(self)
    }

    /// Checks `token` before every row group or stream batch.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn read(self, limit: RowLimit) -> Result<Table, ColumnarError> {
        self.read_with_stats(limit).map(|(table, _)| table)
    }

    pub fn read_with_stats(self, limit: RowLimit) -> Result<(Table, ReadStats), ColumnarError> {
        let Self {
            source,
            projection,
            cancel,
        } = self;
        let mut remaining = limit.max_rows();
        let mut stats = ReadStats::default();
        let mut batches = Vec::new();

        let schema = match source {
            Source::RowGroups {
                mut reader,
                metadata,
                schema: file_schema,
            } => {
                let (indices, schema) = match projection {
                    Some(p) => p,
                    None => ((0..file_schema.len()).collect(), file_schema),
                };
                let total = metadata.row_groups.len();
                for group in 0..total {
                    if remaining == 0 {
                        stats.groups_skipped = total - group;
                        break;
                    }
                    CancelToken::check(cancel.as_ref())?;
                    let batch = read_row_group(&mut reader, &metadata, group, &indices, &schema)?;
                    stats.groups_decoded += 1;
                    remaining = take_prefix(batch, remaining, &mut batches);
                }
                schema
            }
            Source::Stream(stream) => {
                let mut stream = match cancel {
                    Some(token) => stream.with_cancel(token),
                    None => stream,
                };
                let schema = match &projection {
                    Some((_, schema)) => schema.clone(),
                    None => stream.schema().clone(),
                };
                while remaining > 0 {
                    let Some(batch) = stream.next_batch()? else {
                        break;
                    };
                    stats.groups_decoded += 1;
                    let batch = match &projection {
                        Some((indices, schema)) => batch.project_with(schema.clone(), indices),
                        None => batch,
                    };
                    remaining = take_prefix(batch, remaining, &mut batches);
                }
                schema
            }
        };

        let table = Table::try_new(schema, batches)?;
        stats.rows = table.num_rows();
        debug!(
            ?limit,
            rows = stats.rows,
            groups_decoded = stats.groups_decoded,
            groups_skipped = stats.groups_skipped,
            "bounded read"
        );
        Ok((table, stats))
    }
}

/// Pushes as much of `batch` as `remaining` allows and returns what is left.
fn take_prefix(batch: Batch, remaining: usize, out: &mut Vec<Batch>) -> usize {
    if batch.num_rows() <= remaining {
        let left = remaining - batch.num_rows();
        out.push(batch);
        left
    } else {
        out.push(batch.slice(0, remaining));
        0
    }
}

/// Reads the first rows of the columnar file at `path`.
///
/// `columns` restricts the result to those columns, kept in file order; a name
/// missing from the file fails with [ColumnarError::ColumnNotFound] before any
/// data is decoded.
pub fn read_bounded<P: AsRef<Path>>(
    path: P,
    limit: RowLimit,
    columns: Option<&[&str]>,
) -> Result<Table, ColumnarError> {
    let reader = BoundedReader::open(path)?;
    let reader = match columns {
        Some(columns) => reader.project(columns)?,
        None => reader,
    };
    reader.read(limit)
}
