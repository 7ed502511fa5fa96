use std::sync::Arc;

use colframe::{Batch, Column, DataType, Field, Schema, SchemaRef, Table};
use rand::{rngs::StdRng, Rng, SeedableRng};

mod files;
mod query;
mod wire;

/// `id: int32, name: utf8 (nullable), score: float64`
pub fn people_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int32, false),
        Field::new("name", DataType::Utf8, true),
        Field::new("score", DataType::Float64, true),
    ]))
}

/// Two batches of 4 and 6 rows; row 2 has a null name.
pub fn people() -> Table {
    let schema = people_schema();
    let first = Batch::try_new(
        schema.clone(),
        vec![
            Column::from(vec![1i32, 2, 3, 4]),
            Column::from(vec![Some("ann"), Some("bob"), None, Some("dan")]),
            Column::from(vec![0.5f64, 1.5, 2.5, 3.5]),
        ],
    )
    .unwrap();
    let second = Batch::try_new(
        schema.clone(),
        vec![
            Column::from(vec![5i32, 6, 7, 8, 9, 10]),
            Column::from(vec!["eve", "fay", "gus", "hal", "ivy", "jon"]),
            Column::from(vec![Some(4.5f64), None, Some(-1.0), Some(0.0), Some(9.75), Some(1e300)]),
        ],
    )
    .unwrap();
    Table::try_new(schema, vec![first, second]).unwrap()
}

pub fn every_type_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("b", DataType::Boolean, true),
        Field::new("i32", DataType::Int32, true),
        Field::new("i64", DataType::Int64, true),
        Field::new("u64", DataType::UInt64, true),
        Field::new("f32", DataType::Float32, true),
        Field::new("f64", DataType::Float64, true),
        Field::new("s", DataType::Utf8, true),
        Field::new("bin", DataType::Binary, true),
    ]))
}

fn maybe<T>(rng: &mut StdRng, value: T) -> Option<T> {
    if rng.gen_bool(0.15) {
        None
    } else {
        Some(value)
    }
}

/// A random batch covering every column type, with about 15% nulls.
pub fn random_batch(rng: &mut StdRng, schema: &SchemaRef, rows: usize) -> Batch {
    let mut b = Vec::with_capacity(rows);
    let mut i32s = Vec::with_capacity(rows);
    let mut i64s = Vec::with_capacity(rows);
    let mut u64s = Vec::with_capacity(rows);
    let mut f32s = Vec::with_capacity(rows);
    let mut f64s = Vec::with_capacity(rows);
    let mut strings = Vec::with_capacity(rows);
    let mut bins = Vec::with_capacity(rows);
    for _ in 0..rows {
        let v = rng.gen::<bool>();
        b.push(maybe(rng, v));
        let v = rng.gen_range(-1000i32..1000);
        i32s.push(maybe(rng, v));
        let v = rng.gen::<i64>();
        i64s.push(maybe(rng, v));
        let v = rng.gen_range(0u64..8);
        u64s.push(maybe(rng, v));
        let v = rng.gen::<f32>() * 100.0;
        f32s.push(maybe(rng, v));
        let v = rng.gen::<f64>();
        f64s.push(maybe(rng, v));
        let v = format!("s{}", rng.gen_range(0..5));
        strings.push(maybe(rng, v));
        let len = rng.gen_range(0usize..6);
        let v: Vec<u8> = (0..len).map(|_| rng.gen::<u8>()).collect();
        bins.push(maybe(rng, v));
    }
    Batch::try_new(
        schema.clone(),
        vec![
            Column::Boolean(b),
            Column::Int32(i32s),
            Column::Int64(i64s),
            Column::UInt64(u64s),
            Column::Float32(f32s),
            Column::Float64(f64s),
            Column::Utf8(strings),
            Column::Binary(bins),
        ],
    )
    .unwrap()
}

pub fn random_table(seed: u64, batch_sizes: &[usize]) -> Table {
    let mut rng = StdRng::seed_from_u64(seed);
    let schema = every_type_schema();
    let batches = batch_sizes
        .iter()
        .map(|&rows| random_batch(&mut rng, &schema, rows))
        .collect();
    Table::try_new(schema, batches).unwrap()
}

/// `n: uint64, parity: bool, label: utf8`, `rows` rows cut into batches of
/// `batch_size`.
pub fn counting_table(rows: u64, batch_size: u64) -> Table {
    let schema = Arc::new(Schema::new(vec![
        Field::new("n", DataType::UInt64, false),
        Field::new("parity", DataType::Boolean, false),
        Field::new("label", DataType::Utf8, true),
    ]));
    let mut batches = Vec::new();
    let mut start = 0;
    while start < rows {
        let end = (start + batch_size).min(rows);
        let n: Vec<u64> = (start..end).collect();
        let parity: Vec<bool> = n.iter().map(|i| i % 2 == 0).collect();
        let label: Vec<Option<String>> = n
            .iter()
            .map(|i| (i % 7 != 0).then(|| format!("row-{}", i % 100)))
            .collect();
        batches.push(
            Batch::try_new(
                schema.clone(),
                vec![Column::from(n), Column::from(parity), Column::from(label)],
            )
            .unwrap(),
        );
        start = end;
    }
    Table::try_new(schema, batches).unwrap()
}
