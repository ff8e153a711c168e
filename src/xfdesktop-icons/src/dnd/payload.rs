//! Wire form of a drag batch
//!
//! Supports both bincode (compact binary) and JSON (readable by other
//! desktop components) serialization.

use serde::{Deserialize, Serialize};

use super::DragBatch;
use crate::error::{IconViewError, Result};

/// Selection target name offered for icon drags
pub const DRAG_TARGET: &str = "XFDESKTOP_ICON";

/// Payload format version for compatibility checking
pub const PAYLOAD_VERSION: u32 = 1;

/// Encoding format for drag payloads
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DragEncoding {
    /// Binary encoding using bincode
    #[default]
    Bincode,
    /// JSON encoding
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragPayload {
    pub version: u32,
    pub batch: DragBatch,
}

impl DragPayload {
    pub fn new(batch: DragBatch) -> Self {
        Self {
            version: PAYLOAD_VERSION,
            batch,
        }
    }

    pub fn encode(&self, encoding: DragEncoding) -> Result<Vec<u8>> {
        match encoding {
            DragEncoding::Bincode => {
                bincode::serialize(self).map_err(|e| IconViewError::Payload(e.to_string()))
            }
            DragEncoding::Json => {
                serde_json::to_vec(self).map_err(|e| IconViewError::Payload(e.to_string()))
            }
        }
    }

    /// Decode and check the version. An empty batch decodes fine; the drop
    /// target rejects it.
    pub fn decode(data: &[u8], encoding: DragEncoding) -> Result<Self> {
        if data.is_empty() {
            return Err(IconViewError::EmptyPayload);
        }
        let payload: Self = match encoding {
            DragEncoding::Bincode => {
                bincode::deserialize(data).map_err(|e| IconViewError::Payload(e.to_string()))?
            }
            DragEncoding::Json => {
                serde_json::from_slice(data).map_err(|e| IconViewError::Payload(e.to_string()))?
            }
        };
        if payload.version != PAYLOAD_VERSION {
            return Err(IconViewError::Payload(format!(
                "unsupported payload version {} (expected {})",
                payload.version, PAYLOAD_VERSION
            )));
        }
        Ok(payload)
    }
}
