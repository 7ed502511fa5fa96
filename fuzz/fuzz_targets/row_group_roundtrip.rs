#![no_main]
use std::io::Cursor;
use std::num::NonZeroUsize;

use colframe::{file::RowGroupWriter, BoundedReader, CompressConfig, RowLimit};
use colframe_fuzz::FuzzTable;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (FuzzTable, u8, bool)| {
    let (FuzzTable(table), group_size, compress) = input;
    let compress = compress.then(|| CompressConfig::from_level(0, 6));
    let mut writer = RowGroupWriter::try_new(
        Vec::new(),
        table.schema().clone(),
        NonZeroUsize::new(group_size as usize),
        compress,
    )
    .unwrap();
    for batch in table.batches() {
        writer.write_batch(batch).unwrap();
    }
    let bytes = writer.finish().unwrap();
    let back = BoundedReader::new(Cursor::new(bytes))
        .unwrap()
        .read(RowLimit::All)
        .unwrap();
    assert_eq!(back.num_rows(), table.num_rows());
    assert_eq!(
        back.combine_batches().unwrap(),
        table.combine_batches().unwrap()
    );
});
