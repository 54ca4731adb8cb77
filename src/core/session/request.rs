use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::Display;

use crate::error::RequestError;

/// Minimum length of a base64 image payload.
pub const MIN_IMAGE_CHARS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One prior message as sent upstream. Assistant content may be structured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: Value,
}

impl HistoryMessage {
    /// Content as text: strings pass through, anything else is JSON-encoded.
    pub fn text(&self) -> String {
        match &self.content {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

/// Body of an analysis request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_context: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryMessage>,
}

impl AnalysisRequest {
    pub fn from_context(context: impl Into<String>) -> Self {
        Self {
            user_context: Some(context.into()),
            ..Self::default()
        }
    }

    /// Decode a request body and validate it.
    pub fn parse(body: Value) -> Result<Self, RequestError> {
        let request: Self =
            serde_json::from_value(body).map_err(|e| RequestError::Body(e.to_string()))?;
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), RequestError> {
        if let Some(image) = &self.image_base64
            && image.len() < MIN_IMAGE_CHARS
        {
            return Err(RequestError::ImageTooShort {
                min: MIN_IMAGE_CHARS,
            });
        }
        if self.image_base64.is_none() && self.context().is_none() {
            return Err(RequestError::NothingToAnalyze);
        }
        Ok(())
    }

    /// Trimmed user context, `None` when absent or blank.
    pub fn context(&self) -> Option<&str> {
        self.user_context
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    pub fn context_line(&self) -> String {
        format!("Context: {}", self.context().unwrap_or("General health check"))
    }
}
