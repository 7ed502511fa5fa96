#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(table) = colframe::decode(data) {
        let bytes = colframe::encode(&table).unwrap();
        assert_eq!(colframe::decode(&bytes).unwrap(), table);
    }
});
