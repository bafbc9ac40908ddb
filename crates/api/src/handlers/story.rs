//! Handlers for the story resource.
//!
//! Routes:
//! - `GET  /stories`          -- filtered, sorted, paginated listing
//! - `GET  /stories/{id}`     -- fetch one story
//! - `POST /stories`          -- run the creation pipeline
//! - `POST /stories/publish`  -- Draft -> Published transition

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use storyforge_core::error::CoreError;
use storyforge_core::story;
use storyforge_core::types::DbId;
use storyforge_db::models::story::{Page, Story, StoryFilter, StorySort, StoryStatus};
use storyforge_db::repositories::StoryRepo;
use storyforge_pipeline::CreateStoryRequest;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Query parameters accepted by `GET /stories`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListStoriesParams {
    pub sort: Option<String>,
    pub limit: Option<i64>,
    pub page: Option<i64>,
    pub created_by: Option<String>,
    pub status: Option<StoryStatus>,
}

/// GET /stories
///
/// Defaults: newest first, 20 per page, Published only. Drafts are
/// surfaced only when a status filter asks for them explicitly.
pub async fn list_stories(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<ListStoriesParams>,
) -> AppResult<Json<Vec<Story>>> {
    let sort = params
        .sort
        .as_deref()
        .map(StorySort::parse)
        .transpose()
        .map_err(AppError::Core)?
        .unwrap_or_default();

    let page = Page::from_query(params.page, params.limit);
    let filter = StoryFilter {
        created_by: params.created_by,
        status: params.status,
    };

    let stories = StoryRepo::list(&state.pool, &filter, sort, page).await?;
    Ok(Json(stories))
}

/// GET /stories/{id}
pub async fn get_story(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Story>> {
    let story = StoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Story",
            id,
        }))?;
    Ok(Json(story))
}

/// Body for `POST /stories`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoryBody {
    /// The user's prompt describing the story.
    pub description: String,
    /// Maximum word-count target for the generated text.
    pub word_count: i32,
    /// External auth identifier of the creator.
    pub uid: String,
    /// Marks a privileged content-creator request; such stories start
    /// as drafts instead of auto-publishing.
    #[serde(default)]
    pub by_content_creator: bool,
}

/// POST /stories
///
/// Validates the request, runs the full generation pipeline, and
/// returns the persisted story with 201. Any pipeline failure aborts
/// the request with nothing written.
pub async fn create_story(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(body): Json<CreateStoryBody>,
) -> AppResult<impl IntoResponse> {
    story::validate_story_request(&body.description, body.word_count, &body.uid)
        .map_err(AppError::Core)?;

    let request = CreateStoryRequest {
        description: body.description,
        word_count: body.word_count,
        uid: body.uid,
        by_content_creator: body.by_content_creator,
    };

    let story = state.pipeline.create_story(&request).await?;
    Ok((StatusCode::CREATED, Json(story)))
}

/// Query parameters for `POST /stories/publish`.
#[derive(Debug, Deserialize)]
pub struct PublishParams {
    pub id: DbId,
}

/// POST /stories/publish?id=
///
/// The one-way Draft -> Published transition. Publishing an
/// already-published story re-sets the same status and succeeds.
pub async fn publish_story(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<PublishParams>,
) -> AppResult<Json<Story>> {
    let story = StoryRepo::set_status(&state.pool, params.id, StoryStatus::Published)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Story",
            id: params.id,
        }))?;

    tracing::info!(story_id = story.id, "Story published");
    Ok(Json(story))
}
