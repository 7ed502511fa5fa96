//! Encoding of one column inside one row group.
//!
//! ```text
//! chunk := flag: u8 (0 raw, 1 deflate) | body
//! body  := validity (bool rle, one entry per row) | values of the non-null rows
//! ```
//!
//! Booleans use bool rle, integers delta rle, floats rle over their bit
//! patterns, strings and binary plain rle.

use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};

use crate::{
    codec::{PayloadDecoder, PayloadEncoder},
    compress::{compress, decompress, CompressConfig},
    strategy::{
        AnyRleDecoder, AnyRleEncoder, BoolRleDecoder, BoolRleEncoder, DeltaRleDecoder,
        DeltaRleEncoder, Rleable,
    },
    Column, ColumnarError, DataType,
};

const RAW: u8 = 0;
const DEFLATE: u8 = 1;

/// Smallest and largest non-null value of a column chunk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    Boolean(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub null_count: u64,
    pub min: Option<ScalarValue>,
    pub max: Option<ScalarValue>,
}

fn min_max<T, I>(values: I, to_scalar: impl Fn(T) -> ScalarValue) -> (Option<ScalarValue>, Option<ScalarValue>)
where
    T: PartialOrd + Copy,
    I: Iterator<Item = T>,
{
    match values.minmax() {
        MinMaxResult::NoElements => (None, None),
        MinMaxResult::OneElement(v) => (Some(to_scalar(v)), Some(to_scalar(v))),
        MinMaxResult::MinMax(lo, hi) => (Some(to_scalar(lo)), Some(to_scalar(hi))),
    }
}

pub(crate) fn column_stats(column: &Column) -> ColumnStats {
    let (min, max) = match column {
        Column::Boolean(v) => min_max(v.iter().flatten().copied(), ScalarValue::Boolean),
        Column::Int32(v) => min_max(v.iter().flatten().map(|&x| x as i64), ScalarValue::Int),
        Column::Int64(v) => min_max(v.iter().flatten().copied(), ScalarValue::Int),
        Column::UInt64(v) => min_max(v.iter().flatten().copied(), ScalarValue::UInt),
        Column::Float32(v) => min_max(
            v.iter().flatten().filter(|x| !x.is_nan()).map(|&x| x as f64),
            ScalarValue::Float,
        ),
        Column::Float64(v) => min_max(
            v.iter().flatten().filter(|x| !x.is_nan()).copied(),
            ScalarValue::Float,
        ),
        Column::Utf8(_) | Column::Binary(_) => (None, None),
    };
    ColumnStats {
        null_count: column.null_count() as u64,
        min,
        max,
    }
}

fn write_rle<T: Rleable>(
    enc: &mut PayloadEncoder,
    values: impl Iterator<Item = T>,
) -> Result<(), ColumnarError> {
    let mut rle = AnyRleEncoder::<T>::new(enc);
    for v in values {
        rle.append(v)?;
    }
    rle.finish()
}

fn write_delta(
    enc: &mut PayloadEncoder,
    values: impl Iterator<Item = i128>,
) -> Result<(), ColumnarError> {
    let mut delta = DeltaRleEncoder::new(enc);
    for v in values {
        delta.append(v)?;
    }
    delta.finish()
}

fn encode_body(column: &Column) -> Result<Vec<u8>, ColumnarError> {
    let mut enc = PayloadEncoder::new();
    let mut validity = BoolRleEncoder::new(&mut enc);
    for valid in column.validity() {
        validity.append(valid)?;
    }
    validity.finish()?;

    match column {
        Column::Boolean(v) => {
            let mut bools = BoolRleEncoder::new(&mut enc);
            for &b in v.iter().flatten() {
                bools.append(b)?;
            }
            bools.finish()?;
        }
        Column::Int32(v) => write_delta(&mut enc, v.iter().flatten().map(|&x| x as i128))?,
        Column::Int64(v) => write_delta(&mut enc, v.iter().flatten().map(|&x| x as i128))?,
        Column::UInt64(v) => write_delta(&mut enc, v.iter().flatten().map(|&x| x as i128))?,
        Column::Float32(v) => write_rle(&mut enc, v.iter().flatten().map(|x| x.to_bits()))?,
        Column::Float64(v) => write_rle(&mut enc, v.iter().flatten().map(|x| x.to_bits()))?,
        Column::Utf8(v) => write_rle(&mut enc, v.iter().flatten().cloned())?,
        Column::Binary(v) => write_rle(&mut enc, v.iter().flatten().cloned())?,
    }
    Ok(enc.into_bytes())
}

/// Encodes `column` and computes its statistics.
pub(crate) fn encode_column(
    column: &Column,
    compress_cfg: Option<&CompressConfig>,
) -> Result<(Vec<u8>, ColumnStats), ColumnarError> {
    let body = encode_body(column)?;
    let mut out = Vec::with_capacity(body.len() + 1);
    match compress_cfg {
        Some(cfg) if body.len() >= cfg.threshold => {
            out.push(DEFLATE);
            out.extend(compress(&body, cfg)?);
        }
        _ => {
            out.push(RAW);
            out.extend(body);
        }
    }
    Ok((out, column_stats(column)))
}

fn scatter<T>(validity: &[bool], values: Vec<T>) -> Vec<Option<T>> {
    let mut values = values.into_iter();
    validity
        .iter()
        .map(|&valid| if valid { values.next() } else { None })
        .collect()
}

fn decode_body(body: &[u8], data_type: DataType, rows: usize) -> Result<Column, ColumnarError> {
    let mut de = PayloadDecoder::new(body);
    let validity = BoolRleDecoder::new(&mut de).decode(rows)?;
    let present = validity.iter().filter(|&&v| v).count();

    let column = match data_type {
        DataType::Boolean => {
            Column::Boolean(scatter(&validity, BoolRleDecoder::new(&mut de).decode(present)?))
        }
        DataType::Int32 => {
            Column::Int32(scatter(&validity, DeltaRleDecoder::new(&mut de).decode(present)?))
        }
        DataType::Int64 => {
            Column::Int64(scatter(&validity, DeltaRleDecoder::new(&mut de).decode(present)?))
        }
        DataType::UInt64 => {
            Column::UInt64(scatter(&validity, DeltaRleDecoder::new(&mut de).decode(present)?))
        }
        DataType::Float32 => {
            let bits = AnyRleDecoder::<u32>::new(&mut de).decode(present)?;
            Column::Float32(scatter(&validity, bits.into_iter().map(f32::from_bits).collect()))
        }
        DataType::Float64 => {
            let bits = AnyRleDecoder::<u64>::new(&mut de).decode(present)?;
            Column::Float64(scatter(&validity, bits.into_iter().map(f64::from_bits).collect()))
        }
        DataType::Utf8 => {
            Column::Utf8(scatter(&validity, AnyRleDecoder::new(&mut de).decode(present)?))
        }
        DataType::Binary => {
            Column::Binary(scatter(&validity, AnyRleDecoder::new(&mut de).decode(present)?))
        }
    };
    de.finish()?;
    Ok(column)
}

/// Decodes a chunk written by [encode_column] holding `rows` values.
pub(crate) fn decode_column(
    chunk: &[u8],
    data_type: DataType,
    rows: usize,
) -> Result<Column, ColumnarError> {
    let (&flag, body) = chunk
        .split_first()
        .ok_or_else(|| ColumnarError::format("empty column chunk"))?;
    match flag {
        RAW => decode_body(body, data_type, rows),
        DEFLATE => decode_body(&decompress(body)?, data_type, rows),
        other => Err(ColumnarError::format(format!(
            "unknown column chunk flag {}",
            other
        ))),
    }
}
