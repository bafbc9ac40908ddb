//! Provider seams for the story pipeline.
//!
//! Each external collaborator is reached through a narrow async trait so
//! the pipeline can be exercised with in-memory fakes. The production
//! implementations delegate to the provider client crates.

use async_trait::async_trait;
use storyforge_core::resolution::ImageResolution;
use storyforge_imgur::ImgurClient;
use storyforge_openai::{ModerationVerdict, OpenAiClient};

use crate::error::ProviderFailure;

/// Screens a user prompt against a content policy.
#[async_trait]
pub trait PromptModerator: Send + Sync {
    async fn moderate(&self, input: &str) -> Result<ModerationVerdict, ProviderFailure>;
}

/// Produces the raw delimited story reply for a generation prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderFailure>;
}

/// Produces an ephemeral URL for an illustration at a given resolution.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_image(
        &self,
        prompt: &str,
        resolution: ImageResolution,
    ) -> Result<String, ProviderFailure>;
}

/// Copies an ephemeral image to durable hosting.
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn rehost(&self, ephemeral_url: &str) -> Result<String, ProviderFailure>;
}

#[async_trait]
impl PromptModerator for OpenAiClient {
    async fn moderate(&self, input: &str) -> Result<ModerationVerdict, ProviderFailure> {
        OpenAiClient::moderate(self, input).await.map_err(Into::into)
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderFailure> {
        self.complete(prompt).await.map_err(Into::into)
    }
}

#[async_trait]
impl ImageGenerator for OpenAiClient {
    async fn generate_image(
        &self,
        prompt: &str,
        resolution: ImageResolution,
    ) -> Result<String, ProviderFailure> {
        OpenAiClient::generate_image(self, prompt, resolution)
            .await
            .map_err(Into::into)
    }
}

#[async_trait]
impl ImageHost for ImgurClient {
    async fn rehost(&self, ephemeral_url: &str) -> Result<String, ProviderFailure> {
        ImgurClient::rehost(self, ephemeral_url)
            .await
            .map_err(Into::into)
    }
}
