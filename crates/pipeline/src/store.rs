//! Persistence seam for the pipeline's single atomic write.

use async_trait::async_trait;
use storyforge_db::models::story::{NewStory, Story};
use storyforge_db::repositories::StoryRepo;
use storyforge_db::DbPool;

/// Writes the assembled story record.
///
/// The pipeline calls this exactly once per run, after all external work
/// has succeeded.
#[async_trait]
pub trait StoryStore: Send + Sync {
    /// Insert the assembled story in one atomic write.
    async fn insert(&self, story: &NewStory) -> Result<Story, sqlx::Error>;
}

/// Production store backed by [`StoryRepo`].
pub struct PgStoryStore {
    pool: DbPool,
}

impl PgStoryStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoryStore for PgStoryStore {
    async fn insert(&self, story: &NewStory) -> Result<Story, sqlx::Error> {
        StoryRepo::create(&self.pool, story).await
    }
}
