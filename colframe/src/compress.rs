use std::io::Read;

use flate2::bufread::DeflateDecoder;
use flate2::bufread::DeflateEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use crate::ColumnarError;

/// Deflate settings for row-group column chunks.
///
/// Chunks whose encoded size is below `threshold` are stored raw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressConfig {
    pub threshold: usize,
    /// Deflate level in `0..=9`.
    pub level: u32,
}

const DEFAULT_COMPRESS_THRESHOLD: usize = 256;

impl Default for CompressConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_COMPRESS_THRESHOLD,
            level: Compression::default().level(),
        }
    }
}

impl CompressConfig {
    pub fn from_level(threshold: usize, level: u32) -> Self {
        Self {
            threshold,
            level: level.min(9),
        }
    }

    pub fn from_method(threshold: usize, method: &str) -> Self {
        let compression = match method {
            "fast" => Compression::fast(),
            "best" => Compression::best(),
            _ => Compression::default(),
        };
        Self {
            threshold,
            level: compression.level(),
        }
    }

    fn compression(&self) -> Compression {
        Compression::new(self.level.min(9))
    }
}

pub(crate) fn compress(input: &[u8], cfg: &CompressConfig) -> Result<Vec<u8>, ColumnarError> {
    let mut output = Vec::new();
    let mut encoder = DeflateEncoder::new(input, cfg.compression());
    encoder.read_to_end(&mut output)?;
    Ok(output)
}

pub(crate) fn decompress(input: &[u8]) -> Result<Vec<u8>, ColumnarError> {
    let mut output = Vec::new();
    let mut decoder = DeflateDecoder::new(input);
    decoder
        .read_to_end(&mut output)
        .map_err(|e| ColumnarError::format(format!("corrupt deflate stream: {}", e)))?;
    Ok(output)
}
