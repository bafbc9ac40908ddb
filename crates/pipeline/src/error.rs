//! Pipeline error taxonomy.

use storyforge_core::story::StoryParseError;
use storyforge_imgur::ImgurError;
use storyforge_openai::OpenAiError;

/// A provider-call failure, classified for retry purposes.
///
/// Provider crates report their own error enums; the pipeline reduces
/// them to a message plus a transience flag so the retry layer does not
/// need to know which provider it is wrapping.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ProviderFailure {
    pub message: String,
    /// Whether a retry of the same call could plausibly succeed.
    pub transient: bool,
}

impl From<OpenAiError> for ProviderFailure {
    fn from(err: OpenAiError) -> Self {
        Self {
            transient: err.is_transient(),
            message: err.to_string(),
        }
    }
}

impl From<ImgurError> for ProviderFailure {
    fn from(err: ImgurError) -> Self {
        Self {
            transient: err.is_transient(),
            message: err.to_string(),
        }
    }
}

/// Errors that abort a story-creation pipeline run.
///
/// Every variant aborts the run before the persistence write (except
/// [`PipelineError::Store`], which is the write itself failing), so no
/// partially generated story is ever visible.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The moderation call failed while enforcement is on.
    #[error("Moderation failed: {0}")]
    ModerationProvider(ProviderFailure),

    /// The prompt was flagged by moderation while enforcement is on.
    #[error("Prompt rejected by moderation: {0}")]
    PromptRejected(String),

    /// The text-generation call failed.
    #[error("Text generation failed: {0}")]
    GenerationProvider(ProviderFailure),

    /// The text model's reply did not match the delimited field contract.
    #[error("Malformed story reply: {0}")]
    GenerationParse(#[from] StoryParseError),

    /// An image-generation call failed or returned no usable URL.
    #[error("Image generation failed: {0}")]
    ImageGeneration(ProviderFailure),

    /// A rehosting call failed; the story would otherwise carry an
    /// ephemeral URL.
    #[error("Image upload failed: {0}")]
    ImageUpload(ProviderFailure),

    /// The single persistence write failed.
    #[error("Failed to store story: {0}")]
    Store(#[from] sqlx::Error),
}
