use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::ColumnarError;

/// Cooperative cancellation flag shared between a caller and a running
/// encode/decode/read. It is only polled between chunks or row groups, so a
/// cancelled operation never leaves a half-written chunk behind.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    pub(crate) fn check(token: Option<&CancelToken>) -> Result<(), ColumnarError> {
        match token {
            Some(t) if t.is_cancelled() => Err(ColumnarError::Cancelled),
            _ => Ok(()),
        }
    }
}
