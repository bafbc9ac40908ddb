//! The story creation pipeline.
//!
//! One request flows through moderation, text synthesis, parsing, image
//! synthesis, rehosting, assembly, and a single persistence write, in
//! that order. The two image syntheses (and the two rehosts) run as a
//! concurrent fan-out joined before the next stage; everything else is
//! sequential. The first failing stage aborts the whole run.

use std::sync::Arc;

use storyforge_core::prompt;
use storyforge_core::resolution::ImageResolution;
use storyforge_core::story::{self, StoryDraft};
use storyforge_db::models::story::{NewStory, Story, StoryStatus};

use crate::error::PipelineError;
use crate::providers::{ImageGenerator, ImageHost, PromptModerator, TextGenerator};
use crate::retry::{with_retries, RetryConfig};
use crate::store::StoryStore;

/// Pipeline behavior toggles and retry tuning.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// When `true` a flagged prompt (or a failed moderation call) aborts
    /// creation; when `false` the verdict is logged and ignored.
    pub enforce_moderation: bool,
    /// Backoff applied to every provider call.
    pub retry: RetryConfig,
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                  | Default |
    /// |--------------------------|---------|
    /// | `ENFORCE_MODERATION`     | `false` |
    /// | `RETRY_MAX_ATTEMPTS`     | `3`     |
    /// | `RETRY_INITIAL_DELAY_MS` | `500`   |
    pub fn from_env() -> Self {
        let enforce_moderation: bool = std::env::var("ENFORCE_MODERATION")
            .unwrap_or_else(|_| "false".into())
            .parse()
            .expect("ENFORCE_MODERATION must be 'true' or 'false'");

        let mut retry = RetryConfig::default();
        if let Ok(attempts) = std::env::var("RETRY_MAX_ATTEMPTS") {
            retry.max_attempts = attempts
                .parse()
                .expect("RETRY_MAX_ATTEMPTS must be a valid u32");
        }
        if let Ok(delay_ms) = std::env::var("RETRY_INITIAL_DELAY_MS") {
            retry.initial_delay = std::time::Duration::from_millis(
                delay_ms
                    .parse()
                    .expect("RETRY_INITIAL_DELAY_MS must be a valid u64"),
            );
        }

        Self {
            enforce_moderation,
            retry,
        }
    }
}

/// A validated story-creation request.
#[derive(Debug, Clone)]
pub struct CreateStoryRequest {
    /// The user's prompt describing the story.
    pub description: String,
    /// Maximum word-count target passed to the text model.
    pub word_count: i32,
    /// External auth identifier of the creator.
    pub uid: String,
    /// Whether the request comes from a privileged content-creator flow.
    pub by_content_creator: bool,
}

/// The assembled pipeline with its provider seams.
///
/// Construct once at startup and share; every run is independent, so
/// concurrent requests need no coordination beyond the store itself.
pub struct StoryPipeline {
    moderator: Arc<dyn PromptModerator>,
    text: Arc<dyn TextGenerator>,
    images: Arc<dyn ImageGenerator>,
    host: Arc<dyn ImageHost>,
    store: Arc<dyn StoryStore>,
    config: PipelineConfig,
}

impl StoryPipeline {
    pub fn new(
        moderator: Arc<dyn PromptModerator>,
        text: Arc<dyn TextGenerator>,
        images: Arc<dyn ImageGenerator>,
        host: Arc<dyn ImageHost>,
        store: Arc<dyn StoryStore>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            moderator,
            text,
            images,
            host,
            store,
            config,
        }
    }

    /// Run the full creation pipeline and return the persisted story.
    ///
    /// Stage order: moderate, synthesize text, parse, synthesize both
    /// images, rehost both images, assemble, persist. Any failure aborts
    /// the run with nothing written.
    pub async fn create_story(&self, request: &CreateStoryRequest) -> Result<Story, PipelineError> {
        self.moderate(&request.description).await?;

        let draft = self.synthesize_text(request).await?;

        let image_prompt = prompt::build_image_prompt(&request.description, &draft);

        let (full_ephemeral, thumb_ephemeral) = tokio::try_join!(
            self.synthesize_image(&image_prompt, ImageResolution::Full),
            self.synthesize_image(&image_prompt, ImageResolution::Thumbnail),
        )?;

        let (image_url, thumbnail_url) = tokio::try_join!(
            self.rehost(&full_ephemeral),
            self.rehost(&thumb_ephemeral),
        )?;

        let story = assemble(draft, image_url, thumbnail_url, request);
        tracing::info!(
            created_by = %request.uid,
            status = story.status.as_str(),
            "Story pipeline complete, persisting"
        );
        Ok(self.store.insert(&story).await?)
    }

    /// Screen the prompt. See [`PipelineConfig::enforce_moderation`] for
    /// the fail-open/fail-closed split.
    async fn moderate(&self, input: &str) -> Result<(), PipelineError> {
        let verdict = with_retries(&self.config.retry, "moderation", || {
            self.moderator.moderate(input)
        })
        .await;

        match verdict {
            Ok(verdict) if verdict.flagged => {
                if self.config.enforce_moderation {
                    Err(PipelineError::PromptRejected(format!(
                        "flagged categories: {}",
                        verdict.categories.join(", ")
                    )))
                } else {
                    tracing::warn!(
                        categories = ?verdict.categories,
                        "Prompt flagged by moderation (enforcement off)"
                    );
                    Ok(())
                }
            }
            Ok(_) => Ok(()),
            Err(failure) => {
                if self.config.enforce_moderation {
                    Err(PipelineError::ModerationProvider(failure))
                } else {
                    tracing::warn!(error = %failure, "Moderation check failed (enforcement off)");
                    Ok(())
                }
            }
        }
    }

    /// Invoke the text model and parse its delimited reply into a draft.
    async fn synthesize_text(
        &self,
        request: &CreateStoryRequest,
    ) -> Result<StoryDraft, PipelineError> {
        let story_prompt = prompt::build_story_prompt(&request.description, request.word_count);

        let reply = with_retries(&self.config.retry, "text-generation", || {
            self.text.generate_text(&story_prompt)
        })
        .await
        .map_err(PipelineError::GenerationProvider)?;

        Ok(story::parse_story_reply(&reply)?)
    }

    /// Generate one illustration at the given resolution.
    async fn synthesize_image(
        &self,
        image_prompt: &str,
        resolution: ImageResolution,
    ) -> Result<String, PipelineError> {
        with_retries(&self.config.retry, "image-generation", || {
            self.images.generate_image(image_prompt, resolution)
        })
        .await
        .map_err(PipelineError::ImageGeneration)
    }

    /// Copy one ephemeral image to durable hosting.
    async fn rehost(&self, ephemeral_url: &str) -> Result<String, PipelineError> {
        with_retries(&self.config.retry, "image-rehost", || {
            self.host.rehost(ephemeral_url)
        })
        .await
        .map_err(PipelineError::ImageUpload)
    }
}

/// Compose the final record from the draft, the durable URLs, and the
/// caller's identity.
///
/// Content-creator stories enter the lifecycle as Draft awaiting an
/// explicit publish step; self-serve stories go live immediately.
fn assemble(
    draft: StoryDraft,
    image_url: String,
    thumbnail_url: String,
    request: &CreateStoryRequest,
) -> NewStory {
    let status = if request.by_content_creator {
        StoryStatus::Draft
    } else {
        StoryStatus::Published
    };

    NewStory {
        title: draft.title,
        genre: draft.genre,
        summary: draft.summary,
        content: draft.content,
        image_url,
        thumbnail_url,
        status,
        created_by: request.uid.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use storyforge_openai::ModerationVerdict;

    use super::*;
    use crate::error::ProviderFailure;

    // -----------------------------------------------------------------------
    // Fakes
    // -----------------------------------------------------------------------

    struct FakeModerator {
        verdict: Result<ModerationVerdict, &'static str>,
    }

    #[async_trait]
    impl PromptModerator for FakeModerator {
        async fn moderate(&self, _input: &str) -> Result<ModerationVerdict, ProviderFailure> {
            self.verdict.clone().map_err(|message| ProviderFailure {
                message: message.to_string(),
                transient: false,
            })
        }
    }

    struct FakeText {
        reply: String,
        calls: AtomicU32,
        /// Number of leading calls that fail with a transient error.
        transient_failures: u32,
    }

    impl FakeText {
        fn replying(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: AtomicU32::new(0),
                transient_failures: 0,
            }
        }
    }

    #[async_trait]
    impl TextGenerator for FakeText {
        async fn generate_text(&self, _prompt: &str) -> Result<String, ProviderFailure> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.transient_failures {
                return Err(ProviderFailure {
                    message: "provider hiccup".to_string(),
                    transient: true,
                });
            }
            Ok(self.reply.clone())
        }
    }

    struct FakeImages {
        calls: AtomicU32,
        fail: bool,
    }

    impl FakeImages {
        fn working() -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl ImageGenerator for FakeImages {
        async fn generate_image(
            &self,
            _prompt: &str,
            resolution: ImageResolution,
        ) -> Result<String, ProviderFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ProviderFailure {
                    message: "missing image url".to_string(),
                    transient: false,
                });
            }
            Ok(format!(
                "https://ephemeral.example/{}.png",
                resolution.dimensions()
            ))
        }
    }

    struct FakeHost {
        /// Rehosting fails for any source URL containing this fragment.
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl ImageHost for FakeHost {
        async fn rehost(&self, ephemeral_url: &str) -> Result<String, ProviderFailure> {
            if let Some(fragment) = self.fail_on {
                if ephemeral_url.contains(fragment) {
                    return Err(ProviderFailure {
                        message: "upload rejected".to_string(),
                        transient: false,
                    });
                }
            }
            Ok(format!("https://durable.example/{}", ephemeral_url.len()))
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        stories: Mutex<Vec<Story>>,
    }

    impl MemoryStore {
        fn count(&self) -> usize {
            self.stories.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl StoryStore for MemoryStore {
        async fn insert(&self, story: &NewStory) -> Result<Story, sqlx::Error> {
            let mut stories = self.stories.lock().unwrap();
            let persisted = Story {
                id: stories.len() as i64 + 1,
                title: story.title.clone(),
                genre: story.genre.clone(),
                summary: story.summary.clone(),
                content: story.content.clone(),
                image_url: story.image_url.clone(),
                thumbnail_url: story.thumbnail_url.clone(),
                status: story.status,
                created_by: story.created_by.clone(),
                created_at: chrono::Utc::now(),
            };
            stories.push(persisted.clone());
            Ok(persisted)
        }
    }

    // -----------------------------------------------------------------------
    // Harness
    // -----------------------------------------------------------------------

    const GOOD_REPLY: &str =
        "Title: The Brave Squirrel|||Genre: Adventure|||Summary: A squirrel dares.|||Content: Once upon a time...";

    fn request() -> CreateStoryRequest {
        CreateStoryRequest {
            description: "a brave squirrel".to_string(),
            word_count: 500,
            uid: "user-1".to_string(),
            by_content_creator: false,
        }
    }

    fn fast_retry() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
            multiplier: 2.0,
        }
    }

    struct Harness {
        pipeline: StoryPipeline,
        images: Arc<FakeImages>,
        store: Arc<MemoryStore>,
    }

    fn harness(
        moderator: FakeModerator,
        text: FakeText,
        images: FakeImages,
        host: FakeHost,
        enforce_moderation: bool,
    ) -> Harness {
        let images = Arc::new(images);
        let store = Arc::new(MemoryStore::default());
        let pipeline = StoryPipeline::new(
            Arc::new(moderator),
            Arc::new(text),
            Arc::clone(&images) as Arc<dyn ImageGenerator>,
            Arc::new(host),
            Arc::clone(&store) as Arc<dyn StoryStore>,
            PipelineConfig {
                enforce_moderation,
                retry: fast_retry(),
            },
        );
        Harness {
            pipeline,
            images,
            store,
        }
    }

    fn default_harness() -> Harness {
        harness(
            FakeModerator {
                verdict: Ok(ModerationVerdict::clean()),
            },
            FakeText::replying(GOOD_REPLY),
            FakeImages::working(),
            FakeHost { fail_on: None },
            false,
        )
    }

    // -----------------------------------------------------------------------
    // End-to-end
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn self_serve_story_publishes_immediately() {
        let h = default_harness();
        let story = h.pipeline.create_story(&request()).await.unwrap();

        assert_eq!(story.status, StoryStatus::Published);
        assert_eq!(story.title, "The Brave Squirrel");
        assert_eq!(story.created_by, "user-1");
        assert_eq!(h.store.count(), 1);

        // Both URLs are durable and never the raw provider URLs.
        assert!(story.image_url.starts_with("https://durable.example/"));
        assert!(story.thumbnail_url.starts_with("https://durable.example/"));
        assert_ne!(story.image_url, story.thumbnail_url);
    }

    #[tokio::test]
    async fn content_creator_story_starts_as_draft() {
        let h = default_harness();
        let story = h
            .pipeline
            .create_story(&CreateStoryRequest {
                by_content_creator: true,
                ..request()
            })
            .await
            .unwrap();

        assert_eq!(story.status, StoryStatus::Draft);
    }

    #[tokio::test]
    async fn both_resolutions_are_generated() {
        let h = default_harness();
        h.pipeline.create_story(&request()).await.unwrap();
        assert_eq!(h.images.calls.load(Ordering::SeqCst), 2);
    }

    // -----------------------------------------------------------------------
    // Failure propagation
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn malformed_reply_aborts_before_any_image_call() {
        let h = harness(
            FakeModerator {
                verdict: Ok(ModerationVerdict::clean()),
            },
            FakeText::replying("Title: X|||Genre: Y|||Summary: Z"),
            FakeImages::working(),
            FakeHost { fail_on: None },
            false,
        );

        let err = h.pipeline.create_story(&request()).await.unwrap_err();
        assert_matches!(err, PipelineError::GenerationParse(_));
        assert_eq!(h.images.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.store.count(), 0);
    }

    #[tokio::test]
    async fn image_generation_failure_persists_nothing() {
        let h = harness(
            FakeModerator {
                verdict: Ok(ModerationVerdict::clean()),
            },
            FakeText::replying(GOOD_REPLY),
            FakeImages::failing(),
            FakeHost { fail_on: None },
            false,
        );

        let err = h.pipeline.create_story(&request()).await.unwrap_err();
        assert_matches!(err, PipelineError::ImageGeneration(_));
        assert_eq!(h.store.count(), 0);
    }

    #[tokio::test]
    async fn thumbnail_rehost_failure_persists_nothing() {
        // The full image rehosts fine; only the thumbnail upload fails.
        let h = harness(
            FakeModerator {
                verdict: Ok(ModerationVerdict::clean()),
            },
            FakeText::replying(GOOD_REPLY),
            FakeImages::working(),
            FakeHost {
                fail_on: Some("256x256"),
            },
            false,
        );

        let err = h.pipeline.create_story(&request()).await.unwrap_err();
        assert_matches!(err, PipelineError::ImageUpload(_));
        assert_eq!(h.store.count(), 0);
    }

    #[tokio::test]
    async fn transient_text_failure_is_retried_to_success() {
        let text = FakeText {
            reply: GOOD_REPLY.to_string(),
            calls: AtomicU32::new(0),
            transient_failures: 1,
        };
        let h = harness(
            FakeModerator {
                verdict: Ok(ModerationVerdict::clean()),
            },
            text,
            FakeImages::working(),
            FakeHost { fail_on: None },
            false,
        );

        let story = h.pipeline.create_story(&request()).await.unwrap();
        assert_eq!(story.status, StoryStatus::Published);
    }

    // -----------------------------------------------------------------------
    // Moderation gating
    // -----------------------------------------------------------------------

    fn flagged_verdict() -> ModerationVerdict {
        ModerationVerdict {
            flagged: true,
            categories: vec!["violence".to_string()],
        }
    }

    #[tokio::test]
    async fn flagged_prompt_is_ignored_by_default() {
        let h = harness(
            FakeModerator {
                verdict: Ok(flagged_verdict()),
            },
            FakeText::replying(GOOD_REPLY),
            FakeImages::working(),
            FakeHost { fail_on: None },
            false,
        );

        assert!(h.pipeline.create_story(&request()).await.is_ok());
    }

    #[tokio::test]
    async fn flagged_prompt_is_rejected_when_enforced() {
        let h = harness(
            FakeModerator {
                verdict: Ok(flagged_verdict()),
            },
            FakeText::replying(GOOD_REPLY),
            FakeImages::working(),
            FakeHost { fail_on: None },
            true,
        );

        let err = h.pipeline.create_story(&request()).await.unwrap_err();
        assert_matches!(err, PipelineError::PromptRejected(_));
        assert_eq!(h.store.count(), 0);
    }

    #[tokio::test]
    async fn moderation_outage_fails_closed_when_enforced() {
        let h = harness(
            FakeModerator {
                verdict: Err("moderation unavailable"),
            },
            FakeText::replying(GOOD_REPLY),
            FakeImages::working(),
            FakeHost { fail_on: None },
            true,
        );

        let err = h.pipeline.create_story(&request()).await.unwrap_err();
        assert_matches!(err, PipelineError::ModerationProvider(_));
    }

    #[tokio::test]
    async fn moderation_outage_fails_open_by_default() {
        let h = harness(
            FakeModerator {
                verdict: Err("moderation unavailable"),
            },
            FakeText::replying(GOOD_REPLY),
            FakeImages::working(),
            FakeHost { fail_on: None },
            false,
        );

        assert!(h.pipeline.create_story(&request()).await.is_ok());
    }
}
