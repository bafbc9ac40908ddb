//! Shared helpers for API integration tests.
//!
//! Builds the full application router with the production middleware
//! stack, a real database pool, and deterministic in-memory provider
//! fakes, so tests exercise the HTTP surface end to end without
//! touching external services.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use sqlx::PgPool;
use tower::ServiceExt;

use storyforge_api::auth::jwt::{generate_session_token, JwtConfig};
use storyforge_api::config::ServerConfig;
use storyforge_api::router::build_app_router;
use storyforge_api::state::AppState;
use storyforge_core::resolution::ImageResolution;
use storyforge_openai::ModerationVerdict;
use storyforge_pipeline::providers::{ImageGenerator, ImageHost, PromptModerator, TextGenerator};
use storyforge_pipeline::{PgStoryStore, PipelineConfig, ProviderFailure, StoryPipeline};

/// Reply every fake text generation returns; parses into a full draft.
pub const FAKE_REPLY: &str = "Title: The Brave Squirrel|||Genre: Adventure|||\
                              Summary: A squirrel dares the great oak.|||\
                              Content: Once upon a time, a squirrel set out.";

/// Prefix of every ephemeral URL the fake image generator returns.
pub const EPHEMERAL_PREFIX: &str = "https://ephemeral.example/";

/// Prefix of every durable URL the fake image host returns.
pub const DURABLE_PREFIX: &str = "https://durable.example/";

struct FakeProviders;

#[async_trait]
impl PromptModerator for FakeProviders {
    async fn moderate(&self, _input: &str) -> Result<ModerationVerdict, ProviderFailure> {
        Ok(ModerationVerdict::clean())
    }
}

#[async_trait]
impl TextGenerator for FakeProviders {
    async fn generate_text(&self, _prompt: &str) -> Result<String, ProviderFailure> {
        Ok(FAKE_REPLY.to_string())
    }
}

#[async_trait]
impl ImageGenerator for FakeProviders {
    async fn generate_image(
        &self,
        _prompt: &str,
        resolution: ImageResolution,
    ) -> Result<String, ProviderFailure> {
        Ok(format!("{EPHEMERAL_PREFIX}{}.png", resolution.dimensions()))
    }
}

#[async_trait]
impl ImageHost for FakeProviders {
    async fn rehost(&self, ephemeral_url: &str) -> Result<String, ProviderFailure> {
        let name = ephemeral_url.trim_start_matches(EPHEMERAL_PREFIX);
        Ok(format!("{DURABLE_PREFIX}{name}"))
    }
}

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            session_expiry_mins: 60,
        },
    }
}

/// Build the full application router with all middleware layers, using
/// the given database pool and deterministic provider fakes.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let providers = Arc::new(FakeProviders);

    let pipeline = Arc::new(StoryPipeline::new(
        Arc::clone(&providers) as Arc<dyn PromptModerator>,
        Arc::clone(&providers) as Arc<dyn TextGenerator>,
        Arc::clone(&providers) as Arc<dyn ImageGenerator>,
        Arc::clone(&providers) as Arc<dyn ImageHost>,
        Arc::new(PgStoryStore::new(pool.clone())),
        PipelineConfig::default(),
    ));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        pipeline,
    };

    build_app_router(state, &config)
}

/// A valid Bearer token for the test JWT secret.
pub fn bearer_token(uid: &str) -> String {
    let token =
        generate_session_token(uid, &test_config().jwt).expect("token generation succeeds");
    format!("Bearer {token}")
}

/// Send a GET request without authentication.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a GET request with a Bearer token.
pub async fn get_auth(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .header("authorization", bearer_token("user-1"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a POST request with a Bearer token and a JSON body.
pub async fn post_json_auth(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("authorization", bearer_token("user-1"))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = http_body_util::BodyExt::collect(response.into_body())
        .await
        .unwrap()
        .to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
