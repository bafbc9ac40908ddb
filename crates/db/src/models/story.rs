//! Story entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storyforge_core::error::CoreError;
use storyforge_core::types::{DbId, Timestamp};

/// Default number of stories returned per listing page.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Hard ceiling on the listing page size.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Publication lifecycle of a story.
///
/// The only legal transition is Draft -> Published; a published story
/// never returns to draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "story_status")]
pub enum StoryStatus {
    Draft,
    Published,
}

impl StoryStatus {
    /// The wire/database spelling of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            StoryStatus::Draft => "Draft",
            StoryStatus::Published => "Published",
        }
    }
}

/// A row from the `stories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: DbId,
    pub title: String,
    pub genre: String,
    pub summary: String,
    pub content: String,
    /// Durable (rehosted) URL, never the ephemeral provider URL.
    pub image_url: String,
    /// Durable (rehosted) URL, never the ephemeral provider URL.
    pub thumbnail_url: String,
    pub status: StoryStatus,
    /// External auth identifier of the creator; immutable after insert.
    pub created_by: String,
    pub created_at: Timestamp,
}

/// DTO for inserting a fully assembled story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStory {
    pub title: String,
    pub genre: String,
    pub summary: String,
    pub content: String,
    pub image_url: String,
    pub thumbnail_url: String,
    pub status: StoryStatus,
    pub created_by: String,
}

/// Filters for listing stories.
///
/// When `status` is `None` listings surface only Published stories, so
/// drafts never leak into general queries by accident.
#[derive(Debug, Clone, Default)]
pub struct StoryFilter {
    pub created_by: Option<String>,
    pub status: Option<StoryStatus>,
}

/// Whitelisted sort orders for story listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorySort {
    /// Newest first (`-createdAt`), the default.
    #[default]
    CreatedAtDesc,
    /// Oldest first (`createdAt`).
    CreatedAtAsc,
}

impl StorySort {
    /// Parse an API-facing sort key. Unknown keys are a validation error
    /// rather than being silently ignored.
    pub fn parse(key: &str) -> Result<Self, CoreError> {
        match key {
            "-createdAt" => Ok(StorySort::CreatedAtDesc),
            "createdAt" => Ok(StorySort::CreatedAtAsc),
            other => Err(CoreError::Validation(format!(
                "Unknown sort key '{other}'. Valid keys: createdAt, -createdAt"
            ))),
        }
    }

    /// The `ORDER BY` clause fragment for this sort.
    pub fn order_clause(self) -> &'static str {
        match self {
            StorySort::CreatedAtDesc => "created_at DESC",
            StorySort::CreatedAtAsc => "created_at ASC",
        }
    }
}

/// Pagination window computed from a 1-based page number and a page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Clamp raw query values into a usable window.
    ///
    /// Missing values default to page 1 with [`DEFAULT_PAGE_SIZE`] items;
    /// the limit is clamped to `1..=MAX_PAGE_SIZE` and the page to >= 1.
    /// The offset is `(page - 1) * limit`.
    pub fn from_query(page: Option<i64>, limit: Option<i64>) -> Self {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let page = page.unwrap_or(1).max(1);
        Page {
            limit,
            offset: (page - 1) * limit,
        }
    }
}
