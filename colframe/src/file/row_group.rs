//! The row-group file layout.
//!
//! ```text
//! "CFRG"
//! row group 0: column chunk 0 | column chunk 1 | ...
//! row group 1: ...
//! footer: postcard(FileMetadata)
//! footer length: u32 LE
//! "CFRG"
//! ```
//!
//! The footer records, for every row group, its row count and where each of its
//! column chunks lives. A reader can therefore stop after any number of groups
//! and pick single columns without touching the rest of the file.

use std::io::{Read, Seek, SeekFrom, Write};
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::column_chunk::{decode_column, encode_column, ColumnStats};
use crate::{
    cancel::CancelToken, compress::CompressConfig, Batch, ColumnarError, Schema, SchemaRef,
};

pub const MAGIC: &[u8; 4] = b"CFRG";
pub const FORMAT_VERSION: u32 = 1;
const TRAILER_LEN: u64 = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub version: u32,
    pub schema: Schema,
    pub num_rows: u64,
    pub row_groups: Vec<RowGroupMeta>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowGroupMeta {
    pub num_rows: u64,
    pub columns: Vec<ColumnChunkMeta>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnChunkMeta {
    /// Absolute position of the chunk in the file.
    pub offset: u64,
    pub length: u64,
    pub stats: ColumnStats,
}

/// Writes batches into the row-group layout.
///
/// Without a row group size every batch becomes one group. With one, batches
/// are buffered and re-cut so that every group but the last holds exactly that
/// many rows.
pub struct RowGroupWriter<W: Write> {
    writer: W,
    schema: SchemaRef,
    row_group_size: Option<NonZeroUsize>,
    compress: Option<CompressConfig>,
    offset: u64,
    row_groups: Vec<RowGroupMeta>,
    pending: Vec<Batch>,
    pending_rows: usize,
    cancel: Option<CancelToken>,
}

impl<W: Write> RowGroupWriter<W> {
    pub fn try_new(
        mut writer: W,
        schema: SchemaRef,
        row_group_size: Option<NonZeroUsize>,
        compress: Option<CompressConfig>,
    ) -> Result<Self, ColumnarError> {
        writer.write_all(MAGIC)?;
        Ok(Self {
            writer,
            schema,
            row_group_size,
            compress,
            offset: MAGIC.len() as u64,
            row_groups: Vec::new(),
            pending: Vec::new(),
            pending_rows: 0,
            cancel: None,
        })
    }

    /// Checks `token` before every row group written from now on.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn write_batch(&mut self, batch: &Batch) -> Result<(), ColumnarError> {
        if batch.schema().as_ref() != self.schema.as_ref() {
            return Err(ColumnarError::SchemaMismatch(format!(
                "batch schema {} does not match file schema {}",
                batch.schema(),
                self.schema
            )));
        }
        let Some(size) = self.row_group_size.map(NonZeroUsize::get) else {
            return self.write_group(batch);
        };

        // top up the partial group left by earlier batches
        let mut offset = 0;
        if self.pending_rows > 0 {
            let need = size - self.pending_rows;
            if batch.num_rows() < need {
                self.pending_rows += batch.num_rows();
                self.pending.push(batch.clone());
                return Ok(());
            }
            self.pending.push(batch.slice(0, need));
            let group = Batch::concat(self.schema.clone(), &std::mem::take(&mut self.pending))?;
            self.pending_rows = 0;
            self.write_group(&group)?;
            offset = need;
        }

        while batch.num_rows() - offset >= size {
            self.write_group(&batch.slice(offset, size))?;
            offset += size;
        }
        let rest = batch.num_rows() - offset;
        if rest > 0 {
            self.pending.push(batch.slice(offset, rest));
            self.pending_rows = rest;
        }
        Ok(())
    }

    fn write_group(&mut self, batch: &Batch) -> Result<(), ColumnarError> {
        CancelToken::check(self.cancel.as_ref())?;
        let mut columns = Vec::with_capacity(batch.num_columns());
        for column in batch.columns() {
            let (bytes, stats) = encode_column(column, self.compress.as_ref())?;
            self.writer.write_all(&bytes)?;
            columns.push(ColumnChunkMeta {
                offset: self.offset,
                length: bytes.len() as u64,
                stats,
            });
            self.offset += bytes.len() as u64;
        }
        trace!(
            group = self.row_groups.len(),
            rows = batch.num_rows(),
            "wrote row group"
        );
        self.row_groups.push(RowGroupMeta {
            num_rows: batch.num_rows() as u64,
            columns,
        });
        Ok(())
    }

    /// Writes any buffered rows and the footer, then flushes the sink.
    pub fn finish(mut self) -> Result<W, ColumnarError> {
        if self.pending_rows > 0 {
            let merged = Batch::concat(self.schema.clone(), &std::mem::take(&mut self.pending))?;
            self.write_group(&merged)?;
        }
        let metadata = FileMetadata {
            version: FORMAT_VERSION,
            schema: self.schema.as_ref().clone(),
            num_rows: self.row_groups.iter().map(|g| g.num_rows).sum(),
            row_groups: std::mem::take(&mut self.row_groups),
        };
        let footer = postcard::to_allocvec(&metadata)?;
        let footer_len = u32::try_from(footer.len())
            .map_err(|_| ColumnarError::format("file footer is too large"))?;
        self.writer.write_all(&footer)?;
        self.writer.write_all(&footer_len.to_le_bytes())?;
        self.writer.write_all(MAGIC)?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

fn to_usize(value: u64) -> Result<usize, ColumnarError> {
    usize::try_from(value).map_err(|_| ColumnarError::format(format!("{} overflows usize", value)))
}

/// Reads and validates the footer of a row-group file.
pub(crate) fn read_metadata<R: Read + Seek>(reader: &mut R) -> Result<FileMetadata, ColumnarError> {
    let file_len = reader.seek(SeekFrom::End(0))?;
    let min_len = MAGIC.len() as u64 + TRAILER_LEN;
    if file_len < min_len {
        return Err(ColumnarError::format("file is too short for a row-group file"));
    }

    let mut head = [0u8; 4];
    reader.seek(SeekFrom::Start(0))?;
    reader.read_exact(&mut head).map_err(ColumnarError::from_read)?;
    let mut trailer = [0u8; TRAILER_LEN as usize];
    reader.seek(SeekFrom::Start(file_len - TRAILER_LEN))?;
    reader.read_exact(&mut trailer).map_err(ColumnarError::from_read)?;
    if &head != MAGIC || &trailer[4..] != MAGIC {
        return Err(ColumnarError::format("missing row-group file magic"));
    }

    let footer_len = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]) as u64;
    if footer_len > file_len - min_len {
        return Err(ColumnarError::format("footer length exceeds the file"));
    }
    let footer_start = file_len - TRAILER_LEN - footer_len;
    let mut footer = vec![0u8; to_usize(footer_len)?];
    reader.seek(SeekFrom::Start(footer_start))?;
    reader.read_exact(&mut footer).map_err(ColumnarError::from_read)?;
    let metadata: FileMetadata = postcard::from_bytes(&footer)?;

    if metadata.version != FORMAT_VERSION {
        return Err(ColumnarError::format(format!(
            "unsupported row-group file version {}",
            metadata.version
        )));
    }
    let mut rows = 0u64;
    for group in &metadata.row_groups {
        if group.columns.len() != metadata.schema.len() {
            return Err(ColumnarError::format(
                "row group column count disagrees with the schema",
            ));
        }
        for chunk in &group.columns {
            let end = chunk.offset.checked_add(chunk.length);
            if chunk.offset < MAGIC.len() as u64 || end.map_or(true, |end| end > footer_start) {
                return Err(ColumnarError::format("column chunk lies outside the data region"));
            }
        }
        rows = rows
            .checked_add(group.num_rows)
            .ok_or_else(|| ColumnarError::format("row count overflow"))?;
    }
    if rows != metadata.num_rows {
        return Err(ColumnarError::format(format!(
            "footer says {} rows but its row groups hold {}",
            metadata.num_rows, rows
        )));
    }
    Ok(metadata)
}

/// Decodes the columns at `indices` of row group `group`, in that order.
pub(crate) fn read_row_group<R: Read + Seek>(
    reader: &mut R,
    metadata: &FileMetadata,
    group: usize,
    indices: &[usize],
    schema: &SchemaRef,
) -> Result<Batch, ColumnarError> {
    let meta = &metadata.row_groups[group];
    let rows = to_usize(meta.num_rows)?;
    let mut columns = Vec::with_capacity(indices.len());
    let mut buf = Vec::new();
    for &i in indices {
        let chunk = &meta.columns[i];
        buf.resize(to_usize(chunk.length)?, 0);
        reader.seek(SeekFrom::Start(chunk.offset))?;
        reader.read_exact(&mut buf).map_err(ColumnarError::from_read)?;
        columns.push(decode_column(&buf, metadata.schema.field(i).data_type, rows)?);
    }
    Batch::try_new(schema.clone(), columns).map_err(|e| ColumnarError::format(e.to_string()))
}
