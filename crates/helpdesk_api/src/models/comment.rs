use serde::Deserialize;
use serde_json::Value;

use crate::error::{HelpdeskError, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct Comment {
    #[serde(default)]
    attachments: Option<Vec<Value>>,
}

impl Comment {
    pub fn from_value(raw: &Value) -> Result<Self> {
        Self::deserialize(raw)
            .map_err(|err| HelpdeskError::Serialization(format!("invalid comment record: {err}")))
    }

    /// Raw attachment records; absent and null lists read as empty.
    pub fn attachments(&self) -> &[Value] {
        self.attachments.as_deref().unwrap_or(&[])
    }
}
