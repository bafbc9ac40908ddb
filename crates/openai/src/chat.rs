//! Chat-completion calls used for story text synthesis.

use serde::Deserialize;

use crate::client::{OpenAiClient, OpenAiError};

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl OpenAiClient {
    /// Submit a single-user-message chat completion and return the first
    /// choice's content.
    ///
    /// Sends `POST /chat/completions` with the configured text model.
    /// A reply without any content is a [`OpenAiError::MissingData`].
    pub async fn complete(&self, prompt: &str) -> Result<String, OpenAiError> {
        let body = serde_json::json!({
            "model": self.text_model(),
            "messages": [{ "role": "user", "content": prompt }],
        });

        let response: ChatResponse = self.post_json("/chat/completions", &body).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(OpenAiError::MissingData("chat completion content"))
    }
}
