use colframe::{
    read_bounded, write, BoundedReader, CompressConfig, ErrorKind, RowLimit, ScalarValue,
    WriteOptions,
};
use tempfile::TempDir;

use crate::{counting_table, people, random_table};

#[test]
fn rewrite_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let table = random_table(42, &[100, 0, 250]);
    for options in [
        WriteOptions::stream(),
        WriteOptions::row_groups(None),
        WriteOptions::row_groups(Some(64)),
        WriteOptions::row_groups(Some(64)).with_compress(None),
    ] {
        let first = dir.path().join("first.col");
        let second = dir.path().join("second.col");
        write(&table, &first, &options).unwrap();
        let read = read_bounded(&first, RowLimit::All, None).unwrap();
        write(&read, &second, &options).unwrap();
        assert_eq!(
            std::fs::read(&first).unwrap(),
            std::fs::read(&second).unwrap(),
            "{:?}",
            options
        );
    }
}

#[test]
fn stream_file_is_the_wire_format() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("people.stream");
    let table = people();
    write(&table, &path, &WriteOptions::stream()).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), colframe::encode(&table).unwrap());
}

#[test]
fn write_replaces_and_leaves_no_temp_files() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("t.col");
    write(&counting_table(50, 10), &path, &WriteOptions::default()).unwrap();
    write(&people(), &path, &WriteOptions::default()).unwrap();
    assert_eq!(read_bounded(&path, RowLimit::All, None).unwrap(), people());
    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("t.col")]);
}

#[test]
fn unwritable_destination() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("t.col");
    let err = write(&people(), &path, &WriteOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(!path.exists());
}

#[test]
fn compression_shrinks_repetitive_columns() {
    let dir = TempDir::new().unwrap();
    let table = counting_table(20_000, 5_000);
    let raw = dir.path().join("raw.col");
    let deflated = dir.path().join("deflated.col");
    write(&table, &raw, &WriteOptions::row_groups(None).with_compress(None)).unwrap();
    let best = CompressConfig::from_method(0, "best");
    write(&table, &deflated, &WriteOptions::row_groups(None).with_compress(Some(best))).unwrap();
    let raw_len = std::fs::metadata(&raw).unwrap().len();
    let deflated_len = std::fs::metadata(&deflated).unwrap().len();
    assert!(deflated_len < raw_len, "{} >= {}", deflated_len, raw_len);

    let a = read_bounded(&raw, RowLimit::All, None).unwrap();
    let b = read_bounded(&deflated, RowLimit::All, None).unwrap();
    assert_eq!(a, b);
    assert_eq!(a, table);
}

#[test]
fn footer_carries_statistics() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stats.col");
    write(&counting_table(30, 10), &path, &WriteOptions::row_groups(Some(15))).unwrap();
    let reader = BoundedReader::open(&path).unwrap();
    let meta = reader.metadata().unwrap();
    assert_eq!(meta.num_rows, 30);
    assert_eq!(meta.row_groups.len(), 2);
    let n = &meta.row_groups[1].columns[0].stats;
    assert_eq!(n.null_count, 0);
    assert_eq!(n.min, Some(ScalarValue::UInt(15)));
    assert_eq!(n.max, Some(ScalarValue::UInt(29)));
    let parity = &meta.row_groups[0].columns[1].stats;
    assert_eq!(parity.min, Some(ScalarValue::Boolean(false)));
    assert_eq!(parity.max, Some(ScalarValue::Boolean(true)));
    // rows 0, 7 and 14 have no label
    assert_eq!(meta.row_groups[0].columns[2].stats.null_count, 3);
    assert_eq!(meta.row_groups[0].columns[2].stats.min, None);
}

#[test]
fn options_load_from_json() {
    let options: WriteOptions = serde_json::from_str(
        r#"{ "format": "row_groups", "row_group_size": 3, "compress": null }"#,
    )
    .unwrap();
    assert_eq!(options, WriteOptions::row_groups(Some(3)).with_compress(None));
    let options: WriteOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(options, WriteOptions::default());
}

#[test]
fn cancelled_write_keeps_the_old_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("t.col");
    write(&people(), &path, &WriteOptions::default()).unwrap();
    let before = std::fs::read(&path).unwrap();

    let token = colframe::CancelToken::new();
    token.cancel();
    for options in [WriteOptions::stream(), WriteOptions::row_groups(Some(4))] {
        let table = counting_table(50, 10);
        let err = colframe::write_with_cancel(&table, &path, &options, &token).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert_eq!(std::fs::read(&path).unwrap(), before);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    let live = colframe::CancelToken::new();
    colframe::write_with_cancel(&people(), &path, &WriteOptions::stream(), &live).unwrap();
    assert_eq!(read_bounded(&path, RowLimit::All, None).unwrap(), people());
}
