use std::sync::Arc;

use colframe::{
    decode, encode, for_each_chunk, CancelToken, ColumnarError, DataType, ErrorKind, Field, Schema,
    StreamReader, StreamWriter, Table,
};

use crate::{people, people_schema, random_table};

#[test]
fn people_round_trip() {
    let table = people();
    let bytes = encode(&table).unwrap();
    let back = decode(&bytes).unwrap();
    assert_eq!(back, table);
    assert_eq!(back.num_batches(), 2);
    assert_eq!(back.num_rows(), 10);
    assert_eq!(back.batches()[0].column(1).null_count(), 1);
}

#[test]
fn zero_batches_round_trip() {
    let table = Table::empty(people_schema());
    let bytes = encode(&table).unwrap();
    let back = decode(&bytes).unwrap();
    assert_eq!(back.schema(), table.schema());
    assert_eq!(back.num_batches(), 0);

    let empty_schema = Table::empty(Arc::new(Schema::empty()));
    assert_eq!(decode(&encode(&empty_schema).unwrap()).unwrap(), empty_schema);
}

#[test]
fn random_tables_round_trip() {
    for seed in 0..8 {
        let table = random_table(seed, &[0, 1, 17, 300, 5]);
        let bytes = encode(&table).unwrap();
        assert_eq!(decode(&bytes).unwrap(), table, "seed {}", seed);
    }
}

#[test]
fn chunks_follow_batches() {
    let table = people();
    let mut chunks = Vec::new();
    for_each_chunk(&table, |chunk| {
        chunks.push(chunk.to_vec());
        Ok(())
    })
    .unwrap();
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0][0], 0);
    assert!(chunks[1..].iter().all(|c| c[0] == 1));
    for chunk in &chunks {
        let len = u32::from_le_bytes([chunk[1], chunk[2], chunk[3], chunk[4]]) as usize;
        assert_eq!(len + 5, chunk.len());
    }
    assert_eq!(chunks.concat(), encode(&table).unwrap());
}

#[test]
fn emit_failure_stops_the_encode() {
    let table = people();
    let mut seen = 0;
    let err = for_each_chunk(&table, |_| {
        seen += 1;
        if seen == 2 {
            Err(ColumnarError::Io(std::io::ErrorKind::BrokenPipe.into()))
        } else {
            Ok(())
        }
    })
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(seen, 2);
}

#[test]
fn truncated_input_is_a_format_error() {
    let bytes = encode(&people()).unwrap();
    for cut in [0, 1, 4, 5, 9, bytes.len() - 1] {
        let err = decode(&bytes[..cut]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format, "cut at {}", cut);
    }
}

#[test]
fn corrupt_input_is_a_format_error() {
    let table = people();
    let schema_len = colframe::stream::schema_chunk(table.schema()).unwrap().len();
    let mut bytes = encode(&table).unwrap();
    // first column tag of the first batch
    let tag = schema_len + 5 + 2;
    assert_eq!(bytes[tag], DataType::Int32.tag());
    bytes[tag] = DataType::Utf8.tag();
    assert_eq!(decode(&bytes).unwrap_err().kind(), ErrorKind::Format);

    let mut bytes = encode(&table).unwrap();
    bytes[tag] = 0xee;
    assert_eq!(decode(&bytes).unwrap_err().kind(), ErrorKind::Format);
}

#[test]
fn incremental_writer_and_reader() {
    let table = people();
    let mut writer = StreamWriter::try_new(Vec::new(), table.schema().clone()).unwrap();
    for batch in table.batches() {
        writer.write_batch(batch).unwrap();
    }
    let bytes = writer.finish().unwrap();
    assert_eq!(bytes, encode(&table).unwrap());

    let reader = StreamReader::try_new(&bytes[..]).unwrap();
    assert_eq!(reader.schema(), table.schema());
    let batches = reader.collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(batches, table.batches());
}

#[test]
fn cancelled_reader_stops() {
    let bytes = encode(&people()).unwrap();
    let token = CancelToken::new();
    let mut reader = StreamReader::try_new(&bytes[..])
        .unwrap()
        .with_cancel(token.clone());
    assert!(reader.next_batch().unwrap().is_some());
    token.cancel();
    let err = reader.next_batch().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(reader.next_batch().unwrap().is_none());
}

#[test]
fn non_nullable_fields_reject_nulls() {
    let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int32, false)]));
    let err = colframe::Batch::try_new(schema, vec![colframe::Column::from(vec![Some(1i32), None])])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
}

#[test]
fn floats_and_repeated_names_survive() {
    let signalling = f64::from_bits(0x7ff0_0000_0000_0001);
    let signalling32 = f32::from_bits(0x7f80_0001);
    let schema = Arc::new(Schema::new(vec![
        Field::new("v", DataType::Float64, true),
        Field::new("v", DataType::Float32, true),
        Field::new("v", DataType::Utf8, true),
    ]));
    let batch = colframe::Batch::try_new(
        schema.clone(),
        vec![
            colframe::Column::from(vec![Some(signalling), Some(-0.0), None, Some(f64::NAN)]),
            colframe::Column::from(vec![
                Some(-0.0f32),
                Some(signalling32),
                Some(f32::INFINITY),
                None,
            ]),
            colframe::Column::from(vec![Some("a"), None, Some("c"), Some("d")]),
        ],
    )
    .unwrap();
    let table = Table::try_new(schema, vec![batch]).unwrap();
    let back = decode(&encode(&table).unwrap()).unwrap();
    assert_eq!(back, table);

    let names: Vec<_> = back.schema().fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["v", "v", "v"]);
    let colframe::Column::Float64(f64s) = back.batches()[0].column(0) else {
        panic!("first column should stay float64");
    };
    assert_eq!(f64s[0].map(f64::to_bits), Some(0x7ff0_0000_0000_0001));
    assert_eq!(f64s[1].map(f64::to_bits), Some((-0.0f64).to_bits()));
    let colframe::Column::Float32(f32s) = back.batches()[0].column(1) else {
        panic!("second column should stay float32");
    };
    assert_eq!(f32s[0].map(f32::to_bits), Some((-0.0f32).to_bits()));
    assert_eq!(f32s[1].map(f32::to_bits), Some(0x7f80_0001));
}
