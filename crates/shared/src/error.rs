use serde::{Deserialize, Serialize};

/// Error payload returned by the API on a non-success status.
///
/// Views are inconsistent about the key they use, so all three are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// First message present, in the order `error`, `detail`, `message`.
    pub fn reason(&self) -> Option<&str> {
        self.error
            .as_deref()
            .or(self.detail.as_deref())
            .or(self.message.as_deref())
    }

    /// Decodes a failure body and returns its message, or a generic one built
    /// from the status code when the body is not JSON or carries no message.
    pub fn reason_from_bytes(status: u16, bytes: &[u8]) -> String {
        serde_json::from_slice::<ErrorBody>(bytes)
            .ok()
            .and_then(|body| body.reason().map(str::to_string))
            .unwrap_or_else(|| format!("request failed with status {status}"))
    }
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
