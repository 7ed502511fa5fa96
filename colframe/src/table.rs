use std::sync::Arc;

use crate::{Batch, ColumnarError, Schema, SchemaRef};

/// An ordered list of batches sharing one schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    schema: SchemaRef,
    batches: Vec<Batch>,
}

impl Table {
    pub fn try_new(schema: SchemaRef, batches: Vec<Batch>) -> Result<Self, ColumnarError> {
        for (i, batch) in batches.iter().enumerate() {
            if batch.schema().as_ref() != schema.as_ref() {
                return Err(ColumnarError::SchemaMismatch(format!(
                    "batch {} has schema {}, table has {}",
                    i,
                    batch.schema(),
                    schema
                )));
            }
        }
        Ok(Self { schema, batches })
    }

    /// A table with `schema` and no batches.
    pub fn empty(schema: SchemaRef) -> Self {
        Self {
            schema,
            batches: Vec::new(),
        }
    }

    /// Builds a table from batches, taking the schema of the first one.
    pub fn from_batches(batches: Vec<Batch>) -> Result<Self, ColumnarError> {
        let schema = batches
            .first()
            .map(|b| b.schema().clone())
            .unwrap_or_else(|| Arc::new(Schema::empty()));
        Self::try_new(schema, batches)
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn into_batches(self) -> Vec<Batch> {
        self.batches
    }

    pub fn num_batches(&self) -> usize {
        self.batches.len()
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(Batch::num_rows).sum()
    }

    pub fn num_columns(&self) -> usize {
        self.schema.len()
    }

    /// Keeps the first `n` rows, dropping or slicing batches past the limit.
    pub fn head(&self, n: usize) -> Table {
        let mut remaining = n;
        let mut batches = Vec::new();
        for batch in &self.batches {
            if remaining == 0 {
                break;
            }
            if batch.num_rows() <= remaining {
                remaining -= batch.num_rows();
                batches.push(batch.clone());
            } else {
                batches.push(batch.slice(0, remaining));
                remaining = 0;
            }
        }
        Table {
            schema: self.schema.clone(),
            batches,
        }
    }

    /// Keeps the named columns in schema order.
    pub fn project<S: AsRef<str>>(&self, names: &[S]) -> Result<Table, ColumnarError> {
        let indices = self.schema.projection_indices(names)?;
        let schema = Arc::new(self.schema.project(&indices));
        let batches = self
            .batches
            .iter()
            .map(|b| b.project_with(schema.clone(), &indices))
            .collect();
        Ok(Table { schema, batches })
    }

    /// Merges every batch into one.
    pub fn combine_batches(&self) -> Result<Batch, ColumnarError> {
        Batch::concat(self.schema.clone(), &self.batches)
    }
}
