use serde::{Deserialize, Serialize};

/// Error body the analysis backend attaches to non-2xx upload responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

impl ApiErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// Extracts the backend's message from a response body, if it has one.
    pub fn parse_detail(body: &str) -> Option<String> {
        serde_json::from_str::<Self>(body)
            .ok()
            .map(|parsed| parsed.error)
            .filter(|message| !message.trim().is_empty())
    }
}
