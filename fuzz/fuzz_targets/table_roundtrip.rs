#![no_main]
use colframe_fuzz::FuzzTable;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|table: FuzzTable| {
    let bytes = colframe::encode(&table.0).unwrap();
    let back = colframe::decode(&bytes).unwrap();
    assert_eq!(back, table.0);
});
