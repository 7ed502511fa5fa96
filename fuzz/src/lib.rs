use std::sync::Arc;

use arbitrary::{Arbitrary, Result, Unstructured};
use colframe::{Batch, Column, DataType, Field, Schema, Table};

#[derive(Debug, Clone, Arbitrary)]
pub enum FuzzColumn {
    Boolean(Vec<Option<bool>>),
    Int32(Vec<Option<i32>>),
    Int64(Vec<Option<i64>>),
    UInt64(Vec<Option<u64>>),
    Float32(Vec<Option<f32>>),
    Float64(Vec<Option<f64>>),
    Utf8(Vec<Option<String>>),
    Binary(Vec<Option<Vec<u8>>>),
}

impl FuzzColumn {
    fn data_type(&self) -> DataType {
        match self {
            FuzzColumn::Boolean(_) => DataType::Boolean,
            FuzzColumn::Int32(_) => DataType::Int32,
            FuzzColumn::Int64(_) => DataType::Int64,
            FuzzColumn::UInt64(_) => DataType::UInt64,
            FuzzColumn::Float32(_) => DataType::Float32,
            FuzzColumn::Float64(_) => DataType::Float64,
            FuzzColumn::Utf8(_) => DataType::Utf8,
            FuzzColumn::Binary(_) => DataType::Binary,
        }
    }

    /// Cuts or pads (with nulls) to exactly `rows` values.
    fn into_column(self, rows: usize) -> Column {
        fn fit<T>(mut v: Vec<Option<T>>, rows: usize) -> Vec<Option<T>> {
            v.truncate(rows);
            v.resize_with(rows, || None);
            v
        }
        match self {
            FuzzColumn::Boolean(v) => Column::Boolean(fit(v, rows)),
            FuzzColumn::Int32(v) => Column::Int32(fit(v, rows)),
            FuzzColumn::Int64(v) => Column::Int64(fit(v, rows)),
            FuzzColumn::UInt64(v) => Column::UInt64(fit(v, rows)),
            FuzzColumn::Float32(v) => Column::Float32(fit(v, rows)),
            FuzzColumn::Float64(v) => Column::Float64(fit(v, rows)),
            FuzzColumn::Utf8(v) => Column::Utf8(fit(v, rows)),
            FuzzColumn::Binary(v) => Column::Binary(fit(v, rows)),
        }
    }
}

/// A well-formed table: every batch follows the shape of the first column set
/// and all columns are nullable.
#[derive(Debug, Clone)]
pub struct FuzzTable(pub Table);

impl<'a> Arbitrary<'a> for FuzzTable {
    fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self> {
        let shape: Vec<FuzzColumn> = u.arbitrary()?;
        let shape = &shape[..shape.len().min(6)];
        let fields = shape
            .iter()
            .enumerate()
            .map(|(i, c)| Field::new(format!("c{}", i), c.data_type(), true))
            .collect();
        let schema = Arc::new(Schema::new(fields));

        let num_batches = u.int_in_range(0..=4)?;
        let mut batches = Vec::with_capacity(num_batches);
        for b in 0..num_batches {
            let rows = u.int_in_range(0..=64)?;
            let columns = shape
                .iter()
                .map(|c| {
                    let values = if b == 0 { c.clone() } else { fresh(u, c.data_type())? };
                    Ok(values.into_column(rows))
                })
                .collect::<Result<Vec<_>>>()?;
            let batch = Batch::try_new(schema.clone(), columns)
                .map_err(|_| arbitrary::Error::IncorrectFormat)?;
            batches.push(batch);
        }
        let table =
            Table::try_new(schema, batches).map_err(|_| arbitrary::Error::IncorrectFormat)?;
        Ok(FuzzTable(table))
    }
}

fn fresh(u: &mut Unstructured, data_type: DataType) -> Result<FuzzColumn> {
    Ok(match data_type {
        DataType::Boolean => FuzzColumn::Boolean(u.arbitrary()?),
        DataType::Int32 => FuzzColumn::Int32(u.arbitrary()?),
        DataType::Int64 => FuzzColumn::Int64(u.arbitrary()?),
        DataType::UInt64 => FuzzColumn::UInt64(u.arbitrary()?),
        DataType::Float32 => FuzzColumn::Float32(u.arbitrary()?),
        DataType::Float64 => FuzzColumn::Float64(u.arbitrary()?),
        DataType::Utf8 => FuzzColumn::Utf8(u.arbitrary()?),
        DataType::Binary => FuzzColumn::Binary(u.arbitrary()?),
    })
}
