//! Route definitions for the story resource.
//!
//! ```text
//! GET  /stories          list_stories
//! POST /stories          create_story
//! POST /stories/publish  publish_story
//! GET  /stories/{id}     get_story
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::story;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stories", get(story::list_stories).post(story::create_story))
        .route("/stories/publish", post(story::publish_story))
        .route("/stories/{id}", get(story::get_story))
}
