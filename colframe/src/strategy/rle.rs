/// Reference automerge implementation:
/// https://github.com/automerge/automerge-rs/blob/d7d2916acb17d23d02ae249763aa0cf2f293d880/rust/automerge/src/columnar/encoding/rle.rs
use std::borrow::Borrow;

use crate::{
    codec::{PayloadDecoder, PayloadEncoder},
    ColumnarError,
};

use super::{Rleable, MAX_RLE_COUNT};

/// Alternating run lengths, starting with a run of `false`.
pub(crate) struct BoolRleEncoder<'a> {
    ser: &'a mut PayloadEncoder,
    last: bool,
    count: usize,
}

impl<'a> BoolRleEncoder<'a> {
    pub(crate) fn new(ser: &'a mut PayloadEncoder) -> Self {
        Self {
            ser,
            last: false,
            count: 0,
        }
    }

    pub(crate) fn append(&mut self, value: bool) -> Result<(), ColumnarError> {
        if value == self.last {
            if self.count == MAX_RLE_COUNT {
                // an empty run of the other value keeps the decoder in phase
                self.ser.write(&self.count)?;
                self.ser.write(&0usize)?;
                self.count = 0;
            }
            self.count += 1;
        } else {
            self.ser.write(&self.count)?;
            self.last = value;
            self.count = 1;
        }
        Ok(())
    }

    pub(crate) fn finish(self) -> Result<(), ColumnarError> {
        if self.count > 0 {
            self.ser.write(&self.count)?;
        }
        Ok(())
    }
}

pub(crate) struct AnyRleEncoder<'a, T> {
    ser: &'a mut PayloadEncoder,
    state: RleState<T>,
}

impl<'a, T> AnyRleEncoder<'a, T>
where
    T: Rleable,
{
    pub fn new(ser: &'a mut PayloadEncoder) -> Self {
        Self {
            ser,
            state: RleState::Empty,
        }
    }

    pub(crate) fn append<BT: Borrow<T>>(&mut self, value: BT) -> Result<(), ColumnarError> {
        let value = value.borrow();
        self.state = match self.take_state() {
            RleState::Empty => RleState::LoneVal(value.clone()),
            RleState::LoneVal(other) => {
                if &other == value {
                    RleState::Run(other, 2)
                } else {
                    RleState::LiteralRun(value.clone(), vec![other])
                }
            }
            RleState::Run(other, len) => {
                if &other == value && len < MAX_RLE_COUNT {
                    RleState::Run(other, len + 1)
                } else {
                    self.flush_run(&other, len)?;
                    RleState::LoneVal(value.clone())
                }
            }
            RleState::LiteralRun(last, mut run) => {
                if &last == value {
                    self.flush_lit_run(run)?;
                    RleState::Run(last, 2)
                } else {
                    run.push(last);
                    if run.len() == MAX_RLE_COUNT {
                        self.flush_lit_run(run)?;
                        RleState::LoneVal(value.clone())
                    } else {
                        RleState::LiteralRun(value.clone(), run)
                    }
                }
            }
        };
        Ok(())
    }

    pub(crate) fn finish(mut self) -> Result<(), ColumnarError> {
        match self.take_state() {
            RleState::LoneVal(value) => self.flush_lit_run(vec![value]),
            RleState::Run(value, len) => self.flush_run(&value, len),
            RleState::LiteralRun(last, mut run) => {
                run.push(last);
                self.flush_lit_run(run)
            }
            RleState::Empty => Ok(()),
        }
    }

    fn take_state(&mut self) -> RleState<T> {
        std::mem::replace(&mut self.state, RleState::Empty)
    }

    fn flush_run(&mut self, val: &T, len: usize) -> Result<(), ColumnarError> {
        self.ser.write(&(len as isize))?;
        self.ser.write(val)
    }

    fn flush_lit_run(&mut self, run: Vec<T>) -> Result<(), ColumnarError> {
        self.ser.write(&-(run.len() as isize))?;
        for val in run.iter() {
            self.ser.write(val)?;
        }
        Ok(())
    }
}

enum RleState<T> {
    Empty,
    LiteralRun(T, Vec<T>),
    LoneVal(T),
    Run(T, usize),
}

pub(crate) struct AnyRleDecoder<'a, 'de, T> {
    de: &'a mut PayloadDecoder<'de>,
    last_value: Option<T>,
    count: usize,
    literal: bool,
}

impl<'a, 'de, T> AnyRleDecoder<'a, 'de, T>
where
    T: Rleable,
{
    pub(crate) fn new(de: &'a mut PayloadDecoder<'de>) -> Self {
        Self {
            de,
            last_value: None,
            count: 0,
            literal: false,
        }
    }

    /// Decodes exactly `n` values; the runs must end on the last one.
    pub(crate) fn decode(mut self, n: usize) -> Result<Vec<T>, ColumnarError> {
        let mut values = Vec::with_capacity(n.min(MAX_RLE_COUNT));
        for _ in 0..n {
            values.push(self.next_value()?);
        }
        self.ensure_drained()?;
        Ok(values)
    }

    /// Fails if the current run has values beyond the ones consumed so far.
    pub(crate) fn ensure_drained(&self) -> Result<(), ColumnarError> {
        if self.count != 0 {
            return Err(ColumnarError::RleDecodeError(format!(
                "{} values left in the last run",
                self.count
            )));
        }
        Ok(())
    }

    pub(crate) fn next_value(&mut self) -> Result<T, ColumnarError> {
        while self.count == 0 {
            let count: isize = self.de.read()?;
            // Prevent bad data from causing oom loops
            if count.unsigned_abs() > MAX_RLE_COUNT {
                return Err(ColumnarError::RleDecodeError(format!(
                    "decode Rle count is too large : {}",
                    count
                )));
            }
            match count {
                n if n > 0 => {
                    self.count = n as usize;
                    self.last_value = Some(self.de.read()?);
                    self.literal = false;
                }
                n if n < 0 => {
                    self.count = n.unsigned_abs();
                    self.literal = true;
                }
                _ => return Err(ColumnarError::RleDecodeError("Invalid count".to_string())),
            }
        }
        self.count -= 1;
        if self.literal {
            self.de.read()
        } else {
            self.last_value
                .clone()
                .ok_or_else(|| ColumnarError::RleDecodeError("missing run value".to_string()))
        }
    }
}

pub(crate) struct BoolRleDecoder<'a, 'de> {
    de: &'a mut PayloadDecoder<'de>,
    last_value: bool,
    count: usize,
}

impl<'a, 'de> BoolRleDecoder<'a, 'de> {
    pub(crate) fn new(de: &'a mut PayloadDecoder<'de>) -> Self {
        Self {
            de,
            last_value: true,
            count: 0,
        }
    }

    /// Decodes exactly `n` values; the runs must end on the last one.
    pub(crate) fn decode(mut self, n: usize) -> Result<Vec<bool>, ColumnarError> {
        let mut values = Vec::with_capacity(n.min(MAX_RLE_COUNT));
        for _ in 0..n {
            values.push(self.next_value()?);
        }
        if self.count != 0 {
            return Err(ColumnarError::RleDecodeError(format!(
                "{} values left in the last run",
                self.count
            )));
        }
        Ok(values)
    }

    fn next_value(&mut self) -> Result<bool, ColumnarError> {
        while self.count == 0 {
            self.count = self.de.read()?;
            // Prevent bad data from causing oom loops
            if self.count > MAX_RLE_COUNT {
                return Err(ColumnarError::RleDecodeError(format!(
                    "decode Rle count is too large : {}",
                    self.count
                )));
            }
            self.last_value = !self.last_value;
        }
        self.count -= 1;
        Ok(self.last_value)
    }
}
