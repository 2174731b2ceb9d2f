//! Compression Module
//!
//! Transparent gzip compression for large cache payloads.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::Value;

use crate::cache::entry::StoredValue;
use crate::error::Result;

/// Values whose serialized form exceeds this many bytes are compressed.
pub const COMPRESSION_THRESHOLD: usize = 1024;

// == Encode ==
/// Wraps a value for storage, compressing it if it is large enough.
///
/// Returns the stored payload and whether compression was applied.
pub fn encode(value: Value, enabled: bool) -> Result<(StoredValue, bool)> {
    if !enabled {
        return Ok((StoredValue::Plain(value), false));
    }

    let serialized = serde_json::to_vec(&value)?;
    if serialized.len() <= COMPRESSION_THRESHOLD {
        return Ok((StoredValue::Plain(value), false));
    }

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&serialized)?;
    let data = encoder.finish()?;

    tracing::debug!(
        original = serialized.len(),
        compressed = data.len(),
        "Compressed cache value"
    );

    Ok((
        StoredValue::Compressed {
            data,
            original_size: serialized.len(),
        },
        true,
    ))
}

// == Decode ==
/// Recovers the logical value from a stored payload.
pub fn decode(stored: &StoredValue) -> Result<Value> {
    match stored {
        StoredValue::Plain(value) => Ok(value.clone()),
        StoredValue::Compressed {
            data,
            original_size,
        } => {
            let mut decoder = GzDecoder::new(data.as_slice());
            let mut buf = Vec::with_capacity(*original_size);
            decoder.read_to_end(&mut buf)?;
            Ok(serde_json::from_slice(&buf)?)
        }
    }
}
