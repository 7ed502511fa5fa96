//! The self-framing wire format.
//!
//! ```text
//! stream := schema_chunk batch_chunk*
//! chunk  := chunk_type: u8 | length: u32 LE | payload: [u8; length]
//! ```
//!
//! - `chunk_type = 0`, schema: `varint column_count`, then per column the name
//!   (`varint len` + UTF-8 bytes), the [DataType] tag (`u8`) and the nullable
//!   flag (`u8`).
//! - `chunk_type = 1`, batch: `varint row_count`, `varint column_count`, then per
//!   column its type tag (`u8`) followed by `row_count` values. A value is `0x00`
//!   for null, or `0x01` and the postcard encoding of the value: zigzag varint for
//!   signed integers, varint for `u64`, little-endian IEEE bytes for floats,
//!   length-prefixed bytes for strings and binary, one byte for booleans.
//!
//! Values are copied as they are; nothing is compressed here. One batch chunk is
//! written per [Batch], so chunk boundaries follow batch boundaries.

use std::io::{Read, Write};
use std::sync::Arc;

use serde::Deserialize;
use tracing::trace;

use crate::{
    cancel::CancelToken,
    codec::{PayloadDecoder, PayloadEncoder},
    column::with_values,
    Batch, Column, ColumnarError, DataType, Field, Schema, SchemaRef, Table,
};

pub const CHUNK_HEADER_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ChunkType {
    Schema = 0,
    Batch = 1,
}

impl TryFrom<u8> for ChunkType {
    type Error = ColumnarError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ChunkType::Schema),
            1 => Ok(ChunkType::Batch),
            _ => Err(ColumnarError::InvalidChunkType(value)),
        }
    }
}

fn frame(chunk_type: ChunkType, payload: &[u8]) -> Result<Vec<u8>, ColumnarError> {
    let len = u32::try_from(payload.len()).map_err(|_| {
        ColumnarError::format(format!("chunk payload of {} bytes is too large", payload.len()))
    })?;
    let mut out = Vec::with_capacity(CHUNK_HEADER_LEN + payload.len());
    out.push(chunk_type as u8);
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(payload);
    Ok(out)
}

/// Frames the schema descriptor chunk.
pub fn schema_chunk(schema: &Schema) -> Result<Vec<u8>, ColumnarError> {
    let mut enc = PayloadEncoder::new();
    enc.write(&schema.len())?;
    for field in schema.fields() {
        enc.write(field.name.as_str())?;
        enc.write_u8(field.data_type.tag());
        enc.write(&field.nullable)?;
    }
    frame(ChunkType::Schema, &enc.into_bytes())
}

/// Frames one batch chunk.
pub fn batch_chunk(batch: &Batch) -> Result<Vec<u8>, ColumnarError> {
    let mut enc = PayloadEncoder::new();
    enc.write(&batch.num_rows())?;
    enc.write(&batch.num_columns())?;
    for column in batch.columns() {
        enc.write_u8(column.data_type().tag());
        with_values!(column, values => {
            for value in values {
                enc.write(value)?;
            }
        });
    }
    frame(ChunkType::Batch, &enc.into_bytes())
}

fn decode_schema(payload: &[u8]) -> Result<Schema, ColumnarError> {
    let mut de = PayloadDecoder::new(payload);
    let n: usize = de.read()?;
    let mut fields = Vec::with_capacity(n.min(payload.len()));
    for _ in 0..n {
        let name: String = de.read()?;
        let data_type = DataType::try_from(de.read::<u8>()?)?;
        let nullable: bool = de.read()?;
        fields.push(Field::new(name, data_type, nullable));
    }
    de.finish()?;
    Ok(Schema::new(fields))
}

fn read_values<'de, T: Deserialize<'de>>(
    de: &mut PayloadDecoder<'de>,
    rows: usize,
    capacity: usize,
) -> Result<Vec<Option<T>>, ColumnarError> {
    let mut values = Vec::with_capacity(rows.min(capacity));
    for _ in 0..rows {
        values.push(de.read()?);
    }
    Ok(values)
}

fn decode_batch(payload: &[u8], schema: &SchemaRef) -> Result<Batch, ColumnarError> {
    let mut de = PayloadDecoder::new(payload);
    let rows: usize = de.read()?;
    let num_columns: usize = de.read()?;
    if num_columns != schema.len() {
        return Err(ColumnarError::format(format!(
            "batch has {} columns but the schema has {}",
            num_columns,
            schema.len()
        )));
    }
    let cap = payload.len();
    let mut columns = Vec::with_capacity(num_columns);
    for field in schema.fields() {
        let data_type = DataType::try_from(de.read::<u8>()?)?;
        if data_type != field.data_type {
            return Err(ColumnarError::format(format!(
                "column `{}` is tagged {} but the schema says {}",
                field.name, data_type, field.data_type
            )));
        }
        let column = match data_type {
            DataType::Boolean => Column::Boolean(read_values(&mut de, rows, cap)?),
            DataType::Int32 => Column::Int32(read_values(&mut de, rows, cap)?),
            DataType::Int64 => Column::Int64(read_values(&mut de, rows, cap)?),
            DataType::UInt64 => Column::UInt64(read_values(&mut de, rows, cap)?),
            DataType::Float32 => Column::Float32(read_values(&mut de, rows, cap)?),
            DataType::Float64 => Column::Float64(read_values(&mut de, rows, cap)?),
            DataType::Utf8 => Column::Utf8(read_values(&mut de, rows, cap)?),
            DataType::Binary => Column::Binary(read_values(&mut de, rows, cap)?),
        };
        columns.push(column);
    }
    de.finish()?;
    let batch = Batch::try_new(schema.clone(), columns)
        .map_err(|e| ColumnarError::format(e.to_string()))?;
    if batch.num_rows() != rows {
        return Err(ColumnarError::format(format!(
            "batch declares {} rows but holds {}",
            rows,
            batch.num_rows()
        )));
    }
    Ok(batch)
}

/// Reads one chunk. `None` means the input ended cleanly on a chunk boundary.
fn read_chunk<R: Read>(reader: &mut R) -> Result<Option<(ChunkType, Vec<u8>)>, ColumnarError> {
    let mut tag = [0u8; 1];
    loop {
        match reader.read(&mut tag) {
            Ok(0) => return Ok(None),
            Ok(_) => break,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ColumnarError::Io(e)),
        }
    }
    let chunk_type = ChunkType::try_from(tag[0])?;
    let mut len = [0u8; 4];
    reader.read_exact(&mut len).map_err(ColumnarError::from_read)?;
    let len = u32::from_le_bytes(len) as u64;
    let mut payload = Vec::new();
    reader
        .by_ref()
        .take(len)
        .read_to_end(&mut payload)
        .map_err(ColumnarError::from_read)?;
    if payload.len() as u64 != len {
        return Err(ColumnarError::format(format!(
            "chunk declares {} bytes but only {} remain",
            len,
            payload.len()
        )));
    }
    Ok(Some((chunk_type, payload)))
}

/// Writes a stream incrementally: the schema chunk on creation, then one chunk
/// per [StreamWriter::write_batch] call.
pub struct StreamWriter<W: Write> {
    writer: W,
    schema: SchemaRef,
    cancel: Option<CancelToken>,
    batches: usize,
}

impl<W: Write> StreamWriter<W> {
    pub fn try_new(mut writer: W, schema: SchemaRef) -> Result<Self, ColumnarError> {
        let chunk = schema_chunk(&schema)?;
        writer.write_all(&chunk)?;
        trace!(columns = schema.len(), bytes = chunk.len(), "wrote schema chunk");
        Ok(Self {
            writer,
            schema,
            cancel: None,
            batches: 0,
        })
    }

    /// Checks `token` before every following batch chunk.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn write_batch(&mut self, batch: &Batch) -> Result<(), ColumnarError> {
        CancelToken::check(self.cancel.as_ref())?;
        if batch.schema().as_ref() != self.schema.as_ref() {
            return Err(ColumnarError::SchemaMismatch(format!(
                "batch schema {} does not match stream schema {}",
                batch.schema(),
                self.schema
            )));
        }
        let chunk = batch_chunk(batch)?;
        self.writer.write_all(&chunk)?;
        self.batches += 1;
        trace!(
            batch = self.batches,
            rows = batch.num_rows(),
            bytes = chunk.len(),
            "wrote batch chunk"
        );
        Ok(())
    }

    /// Flushes and hands back the sink.
    pub fn finish(mut self) -> Result<W, ColumnarError> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Reads a stream batch by batch. The schema chunk is consumed on creation.
pub struct StreamReader<R: Read> {
    reader: R,
    schema: SchemaRef,
    cancel: Option<CancelToken>,
    done: bool,
}

impl<R: Read> StreamReader<R> {
    pub fn try_new(mut reader: R) -> Result<Self, ColumnarError> {
        let schema = match read_chunk(&mut reader)? {
            Some((ChunkType::Schema, payload)) => decode_schema(&payload)?,
            Some((ChunkType::Batch, _)) => {
                return Err(ColumnarError::format("stream starts with a batch chunk"))
            }
            None => return Err(ColumnarError::format("empty stream")),
        };
        Ok(Self {
            reader,
            schema: Arc::new(schema),
            cancel: None,
            done: false,
        })
    }

    /// Checks `token` before every following chunk.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn next_batch(&mut self) -> Result<Option<Batch>, ColumnarError> {
        if self.done {
            return Ok(None);
        }
        let res = self.read_next();
        if !matches!(res, Ok(Some(_))) {
            self.done = true;
        }
        res
    }

    fn read_next(&mut self) -> Result<Option<Batch>, ColumnarError> {
        CancelToken::check(self.cancel.as_ref())?;
        match read_chunk(&mut self.reader)? {
            Some((ChunkType::Batch, payload)) => {
                let batch = decode_batch(&payload, &self.schema)?;
                trace!(rows = batch.num_rows(), bytes = payload.len(), "read batch chunk");
                Ok(Some(batch))
            }
            Some((ChunkType::Schema, _)) => Err(ColumnarError::format("repeated schema chunk")),
            None => Ok(None),
        }
    }
}

impl<R: Read> Iterator for StreamReader<R> {
    type Item = Result<Batch, ColumnarError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_batch().transpose()
    }
}

/// Writes `table` as a complete stream into `writer`.
pub fn encode_to<W: Write>(table: &Table, writer: W) -> Result<W, ColumnarError> {
    let mut stream = StreamWriter::try_new(writer, table.schema().clone())?;
    for batch in table.batches() {
        stream.write_batch(batch)?;
    }
    stream.finish()
}

/// Encodes `table` into one buffer.
pub fn encode(table: &Table) -> Result<Vec<u8>, ColumnarError> {
    encode_to(table, Vec::new())
}

/// Hands each framed chunk of `table` to `emit` as soon as it is built, schema
/// chunk first. An error from `emit` stops the encode.
pub fn for_each_chunk<F>(table: &Table, mut emit: F) -> Result<(), ColumnarError>
where
    F: FnMut(&[u8]) -> Result<(), ColumnarError>,
{
    emit(&schema_chunk(table.schema())?)?;
    for batch in table.batches() {
        emit(&batch_chunk(batch)?)?;
    }
    Ok(())
}

/// Decodes a complete stream. Any malformed chunk fails the whole decode.
pub fn decode(bytes: &[u8]) -> Result<Table, ColumnarError> {
    let mut reader = StreamReader::try_new(bytes)?;
    let mut batches = Vec::new();
    while let Some(batch) = reader.next_batch()? {
        batches.push(batch);
    }
    Table::try_new(reader.schema().clone(), batches)
}
