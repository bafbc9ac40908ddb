//! Repository for the `stories` table.

use sqlx::PgPool;
use storyforge_core::types::DbId;

use crate::models::story::{NewStory, Page, Story, StoryFilter, StorySort, StoryStatus};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, genre, summary, content, image_url, thumbnail_url, status, \
                       created_by, created_at";

/// Provides persistence operations for stories.
pub struct StoryRepo;

impl StoryRepo {
    /// Insert a fully assembled story in one atomic write, returning the
    /// created row. `created_at` is assigned by the database.
    pub async fn create(pool: &PgPool, input: &NewStory) -> Result<Story, sqlx::Error> {
        let query = format!(
            "INSERT INTO stories (title, genre, summary, content, image_url, thumbnail_url, \
                                  status, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Story>(&query)
            .bind(&input.title)
            .bind(&input.genre)
            .bind(&input.summary)
            .bind(&input.content)
            .bind(&input.image_url)
            .bind(&input.thumbnail_url)
            .bind(input.status)
            .bind(&input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a story by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Story>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM stories WHERE id = $1");
        sqlx::query_as::<_, Story>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List stories matching `filter`, sorted and paginated.
    ///
    /// An absent status filter defaults to Published so general listings
    /// never surface drafts. The sort key is a whitelisted clause from
    /// [`StorySort`], never caller-supplied SQL.
    pub async fn list(
        pool: &PgPool,
        filter: &StoryFilter,
        sort: StorySort,
        page: Page,
    ) -> Result<Vec<Story>, sqlx::Error> {
        let status = filter.status.unwrap_or(StoryStatus::Published);

        match &filter.created_by {
            Some(creator) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM stories
                     WHERE status = $1 AND created_by = $2
                     ORDER BY {order}
                     LIMIT $3 OFFSET $4",
                    order = sort.order_clause()
                );
                sqlx::query_as::<_, Story>(&query)
                    .bind(status)
                    .bind(creator)
                    .bind(page.limit)
                    .bind(page.offset)
                    .fetch_all(pool)
                    .await
            }
            None => {
                let query = format!(
                    "SELECT {COLUMNS} FROM stories
                     WHERE status = $1
                     ORDER BY {order}
                     LIMIT $2 OFFSET $3",
                    order = sort.order_clause()
                );
                sqlx::query_as::<_, Story>(&query)
                    .bind(status)
                    .bind(page.limit)
                    .bind(page.offset)
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// Set a story's publication status, returning the updated row.
    ///
    /// Returns `None` if no row with the given `id` exists. Setting an
    /// already-held status is a no-op update, so a double publish simply
    /// returns the record unchanged.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: StoryStatus,
    ) -> Result<Option<Story>, sqlx::Error> {
        let query = format!(
            "UPDATE stories SET status = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Story>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }
}
