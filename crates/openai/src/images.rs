//! Image-generation calls used for story illustrations.
//!
//! The provider returns a time-limited URL for each generated image;
//! callers must rehost it before persisting anything.

use serde::Deserialize;
use storyforge_core::resolution::ImageResolution;

use crate::client::{OpenAiClient, OpenAiError};

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    url: Option<String>,
}

impl OpenAiClient {
    /// Generate one image for `prompt` at the given resolution and
    /// return its ephemeral URL.
    ///
    /// Sends `POST /images/generations` with `n = 1`. A response without
    /// a usable URL is a [`OpenAiError::MissingData`].
    pub async fn generate_image(
        &self,
        prompt: &str,
        resolution: ImageResolution,
    ) -> Result<String, OpenAiError> {
        let body = serde_json::json!({
            "prompt": prompt,
            "n": 1,
            "size": resolution.dimensions(),
        });

        let response: ImageResponse = self.post_json("/images/generations", &body).await?;

        let url = response
            .data
            .into_iter()
            .next()
            .and_then(|datum| datum.url)
            .filter(|url| !url.is_empty())
            .ok_or(OpenAiError::MissingData("image url"))?;

        tracing::debug!(size = resolution.dimensions(), "Generated image");
        Ok(url)
    }
}
