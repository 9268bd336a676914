//! Wire codec for replication frames.
//!
//! Updates travel as CBOR. Decode failure means a malformed frame; the
//! replicator drops those rather than erroring.

use bytes::Bytes;

use crate::error::{Result, SyncError};
use crate::messages::CartUpdate;

/// Encode an update into a wire frame.
pub fn encode(update: &CartUpdate) -> Result<Bytes> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(update, &mut buf)
        .map_err(|err| SyncError::Encode(err.to_string()))?;
    Ok(Bytes::from(buf))
}

/// Decode a wire frame into an update.
///
/// Fails for any frame that is not a map carrying both `cart` and
/// `updateId`.
pub fn decode(frame: &[u8]) -> Result<CartUpdate> {
    ciborium::de::from_reader(frame).map_err(|err| SyncError::Decode(err.to_string()))
}
