//! Run-length style encodings applied to column chunks of row-group files.
//!
//! Every decoder is told how many values to produce; the row count of a chunk is
//! known from the file metadata, so a run that overshoots it is an error.

mod delta;
pub(crate) use delta::{DeltaRleDecoder, DeltaRleEncoder};
mod rle;
pub(crate) use rle::{AnyRleDecoder, AnyRleEncoder, BoolRleDecoder, BoolRleEncoder};

use serde::{Deserialize, Serialize};

pub(crate) trait Rleable: Clone + PartialEq + Serialize + for<'de> Deserialize<'de> {}
impl<T> Rleable for T where T: Clone + PartialEq + Serialize + for<'de> Deserialize<'de> {}

const MAX_RLE_COUNT: usize = 1e7 as usize;
