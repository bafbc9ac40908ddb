//! Moderation calls used to screen user prompts before generation.

use serde::Deserialize;

use crate::client::{OpenAiClient, OpenAiError};

/// Verdict returned by the moderation endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationVerdict {
    /// Whether the input violates the provider's content policy.
    pub flagged: bool,
    /// Names of the categories that flagged, empty when clean.
    pub categories: Vec<String>,
}

impl ModerationVerdict {
    /// A verdict that passes the input through unflagged.
    pub fn clean() -> Self {
        Self {
            flagged: false,
            categories: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ModerationResponse {
    results: Vec<ModerationResult>,
}

#[derive(Debug, Deserialize)]
struct ModerationResult {
    flagged: bool,
    #[serde(default)]
    categories: serde_json::Map<String, serde_json::Value>,
}

impl OpenAiClient {
    /// Screen `input` against the provider's content policy.
    ///
    /// Sends `POST /moderations` and reduces the first result to a
    /// [`ModerationVerdict`] carrying the names of the flagged
    /// categories. An empty result list is a [`OpenAiError::MissingData`].
    pub async fn moderate(&self, input: &str) -> Result<ModerationVerdict, OpenAiError> {
        let body = serde_json::json!({ "input": input });

        let response: ModerationResponse = self.post_json("/moderations", &body).await?;

        let result = response
            .results
            .into_iter()
            .next()
            .ok_or(OpenAiError::MissingData("moderation result"))?;

        let categories = result
            .categories
            .into_iter()
            .filter(|(_, flagged)| flagged.as_bool().unwrap_or(false))
            .map(|(name, _)| name)
            .collect();

        Ok(ModerationVerdict {
            flagged: result.flagged,
            categories,
        })
    }
}
