use std::sync::Arc;

use crate::{Column, ColumnarError, Schema, SchemaRef};

/// A set of equal-length columns matching a schema; the unit of transport and
/// of on-disk row groups.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    schema: SchemaRef,
    columns: Vec<Column>,
    num_rows: usize,
}

impl Batch {
    /// Builds a batch, checking column count, column types, lengths and that
    /// non-nullable fields hold no nulls.
    pub fn try_new(schema: SchemaRef, columns: Vec<Column>) -> Result<Self, ColumnarError> {
        if schema.len() != columns.len() {
            return Err(ColumnarError::SchemaMismatch(format!(
                "schema has {} fields but {} columns were given",
                schema.len(),
                columns.len()
            )));
        }
        let num_rows = columns.first().map_or(0, Column::len);
        for (field, column) in schema.fields().iter().zip(&columns) {
            if field.data_type != column.data_type() {
                return Err(ColumnarError::SchemaMismatch(format!(
                    "field `{}` is {} but its column is {}",
                    field.name,
                    field.data_type,
                    column.data_type()
                )));
            }
            if column.len() != num_rows {
                return Err(ColumnarError::SchemaMismatch(format!(
                    "column `{}` has {} rows, expected {}",
                    field.name,
                    column.len(),
                    num_rows
                )));
            }
            if !field.nullable && column.null_count() > 0 {
                return Err(ColumnarError::SchemaMismatch(format!(
                    "non-nullable field `{}` contains nulls",
                    field.name
                )));
            }
        }
        Ok(Self {
            schema,
            columns,
            num_rows,
        })
    }

    /// A batch with no rows.
    pub fn empty(schema: SchemaRef) -> Self {
        let columns = schema
            .fields()
            .iter()
            .map(|f| Column::empty(f.data_type))
            .collect();
        Self {
            schema,
            columns,
            num_rows: 0,
        }
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, i: usize) -> &Column {
        &self.columns[i]
    }

    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.schema.index_of(name).map(|i| &self.columns[i])
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    /// Copies rows `offset..offset + len`.
    ///
    /// # Panics
    ///
    /// If the range is out of bounds.
    pub fn slice(&self, offset: usize, len: usize) -> Batch {
        assert!(offset + len <= self.num_rows, "slice out of bounds");
        Batch {
            schema: self.schema.clone(),
            columns: self.columns.iter().map(|c| c.slice(offset, len)).collect(),
            num_rows: len,
        }
    }

    /// Keeps the columns at `indices` against an already projected schema.
    pub(crate) fn project_with(&self, schema: SchemaRef, indices: &[usize]) -> Batch {
        Batch {
            schema,
            columns: indices.iter().map(|&i| self.columns[i].clone()).collect(),
            num_rows: self.num_rows,
        }
    }

    pub fn project(&self, indices: &[usize]) -> Batch {
        let schema = Arc::new(self.schema.project(indices));
        self.project_with(schema, indices)
    }

    /// Concatenates batches sharing `schema` into one.
    pub fn concat(schema: SchemaRef, batches: &[Batch]) -> Result<Batch, ColumnarError> {
        let mut columns: Vec<Column> = schema
            .fields()
            .iter()
            .map(|f| Column::empty(f.data_type))
            .collect();
        let mut num_rows = 0;
        for batch in batches {
            if batch.schema.as_ref() != schema.as_ref() {
                return Err(ColumnarError::SchemaMismatch(
                    "cannot concatenate batches with different schemas".to_string(),
                ));
            }
            for (dst, src) in columns.iter_mut().zip(&batch.columns) {
                dst.append(src)?;
            }
            num_rows += batch.num_rows;
        }
        Ok(Batch {
            schema,
            columns,
            num_rows,
        })
    }
}

/// Helper for tests and callers assembling a batch from a plain [Schema].
impl TryFrom<(Schema, Vec<Column>)> for Batch {
    type Error = ColumnarError;

    fn try_from((schema, columns): (Schema, Vec<Column>)) -> Result<Self, Self::Error> {
        Batch::try_new(Arc::new(schema), columns)
    }
}
