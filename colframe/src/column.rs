use crate::{ColumnarError, DataType};

/// A typed sequence of nullable values. `None` is a null slot.
#[derive(Debug, Clone)]
pub enum Column {
    Boolean(Vec<Option<bool>>),
    Int32(Vec<Option<i32>>),
    Int64(Vec<Option<i64>>),
    UInt64(Vec<Option<u64>>),
    Float32(Vec<Option<f32>>),
    Float64(Vec<Option<f64>>),
    Utf8(Vec<Option<String>>),
    Binary(Vec<Option<Vec<u8>>>),
}

/// Applies `$body` to the inner vector of any column variant.
macro_rules! with_values {
    ($col:expr, $v:ident => $body:expr) => {
        match $col {
            Column::Boolean($v) => $body,
            Column::Int32($v) => $body,
            Column::Int64($v) => $body,
            Column::UInt64($v) => $body,
            Column::Float32($v) => $body,
            Column::Float64($v) => $body,
            Column::Utf8($v) => $body,
            Column::Binary($v) => $body,
        }
    };
}

/// Like [with_values] but rebuilds a column of the same variant from `$body`.
macro_rules! map_values {
    ($col:expr, $v:ident => $body:expr) => {
        match $col {
            Column::Boolean($v) => Column::Boolean($body),
            Column::Int32($v) => Column::Int32($body),
            Column::Int64($v) => Column::Int64($body),
            Column::UInt64($v) => Column::UInt64($body),
            Column::Float32($v) => Column::Float32($body),
            Column::Float64($v) => Column::Float64($body),
            Column::Utf8($v) => Column::Utf8($body),
            Column::Binary($v) => Column::Binary($body),
        }
    };
}

pub(crate) use with_values;

impl Column {
    pub fn empty(data_type: DataType) -> Self {
        Self::with_capacity(data_type, 0)
    }

    pub fn with_capacity(data_type: DataType, capacity: usize) -> Self {
        match data_type {
            DataType::Boolean => Column::Boolean(Vec::with_capacity(capacity)),
            DataType::Int32 => Column::Int32(Vec::with_capacity(capacity)),
            DataType::Int64 => Column::Int64(Vec::with_capacity(capacity)),
            DataType::UInt64 => Column::UInt64(Vec::with_capacity(capacity)),
            DataType::Float32 => Column::Float32(Vec::with_capacity(capacity)),
            DataType::Float64 => Column::Float64(Vec::with_capacity(capacity)),
            DataType::Utf8 => Column::Utf8(Vec::with_capacity(capacity)),
            DataType::Binary => Column::Binary(Vec::with_capacity(capacity)),
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Column::Boolean(_) => DataType::Boolean,
            Column::Int32(_) => DataType::Int32,
            Column::Int64(_) => DataType::Int64,
            Column::UInt64(_) => DataType::UInt64,
            Column::Float32(_) => DataType::Float32,
            Column::Float64(_) => DataType::Float64,
            Column::Utf8(_) => DataType::Utf8,
            Column::Binary(_) => DataType::Binary,
        }
    }

    pub fn len(&self) -> usize {
        with_values!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn null_count(&self) -> usize {
        with_values!(self, v => v.iter().filter(|x| x.is_none()).count())
    }

    /// Validity of every slot, `true` where the value is present.
    pub fn validity(&self) -> Vec<bool> {
        with_values!(self, v => v.iter().map(Option::is_some).collect())
    }

    /// Copies `len` values starting at `offset`.
    ///
    /// # Panics
    ///
    /// If `offset + len` is out of bounds.
    pub fn slice(&self, offset: usize, len: usize) -> Column {
        map_values!(self, v => v[offset..offset + len].to_vec())
    }

    /// Appends the values of `other`, which must have the same type.
    pub fn append(&mut self, other: &Column) -> Result<(), ColumnarError> {
        match (self, other) {
            (Column::Boolean(a), Column::Boolean(b)) => a.extend_from_slice(b),
            (Column::Int32(a), Column::Int32(b)) => a.extend_from_slice(b),
            (Column::Int64(a), Column::Int64(b)) => a.extend_from_slice(b),
            (Column::UInt64(a), Column::UInt64(b)) => a.extend_from_slice(b),
            (Column::Float32(a), Column::Float32(b)) => a.extend_from_slice(b),
            (Column::Float64(a), Column::Float64(b)) => a.extend_from_slice(b),
            (Column::Utf8(a), Column::Utf8(b)) => a.extend_from_slice(b),
            (Column::Binary(a), Column::Binary(b)) => a.extend_from_slice(b),
            (a, b) => {
                return Err(ColumnarError::SchemaMismatch(format!(
                    "cannot append {} column to {} column",
                    b.data_type(),
                    a.data_type()
                )))
            }
        }
        Ok(())
    }
}

/// Floats are compared by bit pattern, so `NaN == NaN` and `0.0 != -0.0`.
/// Transport only copies bytes, which makes this the equality round-trips keep.
impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Column::Boolean(a), Column::Boolean(b)) => a == b,
            (Column::Int32(a), Column::Int32(b)) => a == b,
            (Column::Int64(a), Column::Int64(b)) => a == b,
            (Column::UInt64(a), Column::UInt64(b)) => a == b,
            (Column::Float32(a), Column::Float32(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|(x, y)| x.map(f32::to_bits) == y.map(f32::to_bits))
            }
            (Column::Float64(a), Column::Float64(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|(x, y)| x.map(f64::to_bits) == y.map(f64::to_bits))
            }
            (Column::Utf8(a), Column::Utf8(b)) => a == b,
            (Column::Binary(a), Column::Binary(b)) => a == b,
            _ => false,
        }
    }
}

macro_rules! impl_from_vec {
    ($($variant:ident => $t:ty),* $(,)?) => {
        $(
            impl From<Vec<Option<$t>>> for Column {
                fn from(v: Vec<Option<$t>>) -> Self {
                    Column::$variant(v)
                }
            }

            impl From<Vec<$t>> for Column {
                fn from(v: Vec<$t>) -> Self {
                    Column::$variant(v.into_iter().map(Some).collect())
                }
            }
        )*
    };
}

impl_from_vec! {
    Boolean => bool,
    Int32 => i32,
    Int64 => i64,
    UInt64 => u64,
    Float32 => f32,
    Float64 => f64,
    Utf8 => String,
    Binary => Vec<u8>,
}

impl From<Vec<Option<&str>>> for Column {
    fn from(v: Vec<Option<&str>>) -> Self {
        Column::Utf8(v.into_iter().map(|s| s.map(str::to_string)).collect())
    }
}

impl From<Vec<&str>> for Column {
    fn from(v: Vec<&str>) -> Self {
        Column::Utf8(v.into_iter().map(|s| Some(s.to_string())).collect())
    }
}
