//! postcard plumbing shared by the wire payloads, the column strategies and the
//! row-group footer.

use postcard::{de_flavors::Flavor as DeFlavor, ser_flavors::Flavor, Deserializer, Serializer};
use serde::{Deserialize, Serialize};

use crate::ColumnarError;

#[derive(Debug)]
pub(crate) struct Cursor<'de> {
    original: &'de [u8],
    pos: usize,
}

impl<'de> Cursor<'de> {
    pub fn new(bytes: &'de [u8]) -> Self {
        Self {
            original: bytes,
            pos: 0,
        }
    }
}

impl<'de> DeFlavor<'de> for Cursor<'de> {
    type Remainder = &'de [u8];
    type Source = &'de [u8];

    fn pop(&mut self) -> postcard::Result<u8> {
        match self.original.get(self.pos) {
            Some(&b) => {
                self.pos += 1;
                Ok(b)
            }
            None => Err(postcard::Error::DeserializeUnexpectedEnd),
        }
    }

    fn try_take_n(&mut self, ct: usize) -> postcard::Result<&'de [u8]> {
        let end = self
            .pos
            .checked_add(ct)
            .ok_or(postcard::Error::DeserializeUnexpectedEnd)?;
        if end > self.original.len() {
            return Err(postcard::Error::DeserializeUnexpectedEnd);
        }
        let sli = &self.original[self.pos..end];
        self.pos = end;
        Ok(sli)
    }

    fn finalize(self) -> postcard::Result<Self::Remainder> {
        Ok(&self.original[self.pos..])
    }
}

/// Reads postcard values one after another from a payload.
pub(crate) struct PayloadDecoder<'de> {
    de: Deserializer<'de, Cursor<'de>>,
}

impl<'de> PayloadDecoder<'de> {
    pub fn new(bytes: &'de [u8]) -> Self {
        Self {
            de: Deserializer::from_flavor(Cursor::new(bytes)),
        }
    }

    pub fn read<T: Deserialize<'de>>(&mut self) -> Result<T, ColumnarError> {
        Ok(T::deserialize(&mut self.de)?)
    }

    /// Consumes the decoder, failing if the payload has unread bytes.
    pub fn finish(self) -> Result<(), ColumnarError> {
        let rest = self.de.finalize()?;
        if rest.is_empty() {
            Ok(())
        } else {
            Err(ColumnarError::format(format!(
                "{} trailing bytes in payload",
                rest.len()
            )))
        }
    }
}

#[derive(Debug, Default, Clone)]
pub(crate) struct AllocVec {
    vec: Vec<u8>,
}

impl Flavor for AllocVec {
    type Output = Vec<u8>;

    #[inline(always)]
    fn try_extend(&mut self, data: &[u8]) -> postcard::Result<()> {
        self.vec.extend_from_slice(data);
        Ok(())
    }

    #[inline(always)]
    fn try_push(&mut self, data: u8) -> postcard::Result<()> {
        self.vec.push(data);
        Ok(())
    }

    fn finalize(self) -> postcard::Result<Self::Output> {
        Ok(self.vec)
    }
}

/// Appends postcard values to a growing payload buffer.
pub(crate) struct PayloadEncoder {
    ser: Serializer<AllocVec>,
}

impl PayloadEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ColumnarError> {
        value.serialize(&mut self.ser)?;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) {
        self.ser.output.vec.push(value);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.ser.output.vec
    }
}

impl Default for PayloadEncoder {
    fn default() -> Self {
        Self {
            ser: Serializer {
                output: AllocVec::default(),
            },
        }
    }
}
