#![no_main]
use std::io::Cursor;

use colframe::{BoundedReader, RowLimit};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (Vec<u8>, u16)| {
    let (data, limit) = input;
    let Ok(reader) = BoundedReader::new(Cursor::new(data)) else {
        return;
    };
    if let Ok(table) = reader.read(RowLimit::First(limit as usize)) {
        assert!(table.num_rows() <= limit as usize);
    }
});
