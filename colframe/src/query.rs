use std::fmt::Display;
use std::io::Write;

use tracing::debug;

use crate::{stream, ColumnarError, Table};

/// Runs SQL text and hands back the full result set.
///
/// The connection (or whatever state the engine needs) lives inside the
/// implementor and is supplied by the caller; nothing here is global.
pub trait QueryExecutor {
    type Error: Display;

    fn execute(&self, sql: &str) -> Result<Table, Self::Error>;
}

impl<F, E> QueryExecutor for F
where
    F: Fn(&str) -> Result<Table, E>,
    E: Display,
{
    type Error = E;

    fn execute(&self, sql: &str) -> Result<Table, E> {
        self(sql)
    }
}

fn run<Q: QueryExecutor + ?Sized>(executor: &Q, sql: &str) -> Result<Table, ColumnarError> {
    executor
        .execute(sql)
        .map_err(|e| ColumnarError::Query(e.to_string()))
}

/// Executes `sql` and encodes the result into the wire format.
pub fn respond<Q: QueryExecutor + ?Sized>(executor: &Q, sql: &str) -> Result<Vec<u8>, ColumnarError> {
    let table = run(executor, sql)?;
    let bytes = stream::encode(&table)?;
    debug!(
        rows = table.num_rows(),
        batches = table.num_batches(),
        bytes = bytes.len(),
        "encoded query result"
    );
    Ok(bytes)
}

/// Like [respond], but streams the chunks into `writer`.
pub fn respond_to<Q, W>(executor: &Q, sql: &str, writer: W) -> Result<W, ColumnarError>
where
    Q: QueryExecutor + ?Sized,
    W: Write,
{
    let table = run(executor, sql)?;
    let writer = stream::encode_to(&table, writer)?;
    debug!(rows = table.num_rows(), "streamed query result");
    Ok(writer)
}
