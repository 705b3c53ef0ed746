//! Attachment metadata listed on ticket comments.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{HelpdeskError, Result};

/// Represents the attachment fields the export depends on: stable id, original file name and the content URL the binary is downloaded from.
#[derive(Debug, Deserialize, Clone)]
pub struct AttachmentMetadata {
    pub id: Value,
    pub file_name: String,
    pub content_url: String,
    pub content_type: Option<String>,
    pub size: Option<u64>,
}

impl AttachmentMetadata {
    /// Reads the typed view out of a raw attachment record.
    pub fn from_value(raw: &Value) -> Result<Self> {
        Self::deserialize(raw).map_err(|err| {
            HelpdeskError::Serialization(format!("invalid attachment record: {err}"))
        })
    }
}
