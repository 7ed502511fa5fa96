use crate::{
    codec::{PayloadDecoder, PayloadEncoder},
    ColumnarError,
};

use super::{AnyRleDecoder, AnyRleEncoder};

/// Run-length encodes the differences between consecutive integers.
pub(crate) struct DeltaRleEncoder<'a> {
    rle: AnyRleEncoder<'a, i128>,
    absolute_value: i128,
}

impl<'a> DeltaRleEncoder<'a> {
    pub(crate) fn new(ser: &'a mut PayloadEncoder) -> Self {
        Self {
            rle: AnyRleEncoder::new(ser),
            absolute_value: 0,
        }
    }

    pub(crate) fn append(&mut self, value: i128) -> Result<(), ColumnarError> {
        let delta = value.saturating_sub(self.absolute_value);
        self.absolute_value = value;
        self.rle.append(delta)
    }

    pub(crate) fn finish(self) -> Result<(), ColumnarError> {
        self.rle.finish()
    }
}

pub(crate) struct DeltaRleDecoder<'a, 'de> {
    rle: AnyRleDecoder<'a, 'de, i128>,
    absolute_value: i128,
}

impl<'a, 'de> DeltaRleDecoder<'a, 'de> {
    pub(crate) fn new(de: &'a mut PayloadDecoder<'de>) -> Self {
        Self {
            rle: AnyRleDecoder::new(de),
            absolute_value: 0,
        }
    }

    /// Decodes exactly `n` values, failing on any that does not fit in `T`.
    pub(crate) fn decode<T: TryFrom<i128>>(mut self, n: usize) -> Result<Vec<T>, ColumnarError> {
        let mut values = Vec::with_capacity(n.min(super::MAX_RLE_COUNT));
        for _ in 0..n {
            let delta = self.rle.next_value()?;
            self.absolute_value = self.absolute_value.saturating_add(delta);
            let value = self.absolute_value.try_into().map_err(|_| {
                ColumnarError::RleDecodeError(format!(
                    "{} cannot be safely converted from i128",
                    self.absolute_value
                ))
            })?;
            values.push(value);
        }
        self.rle.ensure_drained()?;
        Ok(values)
    }
}
