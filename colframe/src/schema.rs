use std::fmt;
use std::sync::Arc;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::ColumnarError;

/// Logical type of a column.
///
/// The discriminant is the type tag written to both the wire format and the
/// row-group file format, so existing values must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum DataType {
    Boolean = 1,
    Int32,
    Int64,
    UInt64,
    Float32,
    Float64,
    Utf8,
    Binary,
}

impl DataType {
    pub fn tag(self) -> u8 {
        self as u8
    }
}

impl From<DataType> for u8 {
    fn from(value: DataType) -> Self {
        value.tag()
    }
}

impl TryFrom<u8> for DataType {
    type Error = ColumnarError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(DataType::Boolean),
            2 => Ok(DataType::Int32),
            3 => Ok(DataType::Int64),
            4 => Ok(DataType::UInt64),
            5 => Ok(DataType::Float32),
            6 => Ok(DataType::Float64),
            7 => Ok(DataType::Utf8),
            8 => Ok(DataType::Binary),
            _ => Err(ColumnarError::InvalidDataType(value)),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Boolean => "bool",
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::UInt64 => "uint64",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
            DataType::Utf8 => "utf8",
            DataType::Binary => "binary",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
        }
    }
}

pub type SchemaRef = Arc<Schema>;

/// Ordered list of fields. Names are not required to be unique; lookups by name
/// resolve to the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, i: usize) -> &Field {
        &self.fields[i]
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Resolves a set of column names into field positions, in schema order.
    ///
    /// The order and multiplicity of `names` do not matter. Any name missing
    /// from the schema is an error.
    pub fn projection_indices<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<usize>, ColumnarError> {
        let mut wanted = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let index = self
                .index_of(name)
                .ok_or_else(|| ColumnarError::ColumnNotFound(name.to_string()))?;
            wanted.push(index);
        }
        Ok(wanted.into_iter().sorted_unstable().dedup().collect())
    }

    pub fn project(&self, indices: &[usize]) -> Schema {
        Schema {
            fields: indices.iter().map(|&i| self.fields[i].clone()).collect(),
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cols = self
            .fields
            .iter()
            .map(|field| format!("{}: {}", field.name, field.data_type))
            .join(", ");
        write!(f, "[{}]", cols)
    }
}
