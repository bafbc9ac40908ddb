//! Shared HTTP client, configuration, and error type for the
//! OpenAI-compatible API.

use std::time::Duration;

/// Default public API base URL.
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model used for story text synthesis.
const DEFAULT_TEXT_MODEL: &str = "gpt-4";

/// Default per-request timeout in seconds. Generation calls are slow;
/// this bounds how long a pipeline stage can hang on the provider.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for the OpenAI-compatible API client.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Bearer API key.
    pub api_key: String,
    /// Base URL including the version segment (default: the public API).
    pub base_url: String,
    /// Chat model used for story text synthesis.
    pub text_model: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl OpenAiConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var               | Required | Default                     |
    /// |-----------------------|----------|-----------------------------|
    /// | `OPENAI_API_KEY`      | **yes**  | --                          |
    /// | `OPENAI_BASE_URL`     | no       | `https://api.openai.com/v1` |
    /// | `OPENAI_TEXT_MODEL`   | no       | `gpt-4`                     |
    /// | `OPENAI_TIMEOUT_SECS` | no       | `60`                        |
    ///
    /// # Panics
    ///
    /// Panics if `OPENAI_API_KEY` is not set.
    pub fn from_env() -> Self {
        let api_key =
            std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY must be set in the environment");

        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());

        let text_model =
            std::env::var("OPENAI_TEXT_MODEL").unwrap_or_else(|_| DEFAULT_TEXT_MODEL.into());

        let timeout_secs: u64 = std::env::var("OPENAI_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .expect("OPENAI_TIMEOUT_SECS must be a valid u64");

        Self {
            api_key,
            base_url,
            text_model,
            timeout_secs,
        }
    }
}

/// Errors from the OpenAI-compatible API layer.
#[derive(Debug, thiserror::Error)]
pub enum OpenAiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("OpenAI API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The provider returned 2xx but the payload was missing the
    /// expected data (e.g. an image entry without a URL).
    #[error("Unexpected OpenAI response: missing {0}")]
    MissingData(&'static str),
}

impl OpenAiError {
    /// Whether a retry of the same request could plausibly succeed.
    ///
    /// Transport failures and provider overload (429) or server errors
    /// are transient; malformed payloads and client errors are not.
    pub fn is_transient(&self) -> bool {
        match self {
            OpenAiError::Request(_) => true,
            OpenAiError::Api { status, .. } => *status == 429 || *status >= 500,
            OpenAiError::MissingData(_) => false,
        }
    }
}

/// HTTP client for the OpenAI-compatible API.
///
/// Cheap to clone; the inner [`reqwest::Client`] pools connections
/// across all calls made through it.
#[derive(Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    /// Create a new client with its own connection pool and the
    /// configured per-request timeout.
    pub fn new(config: OpenAiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to build HTTP client");
        Self { client, config }
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling across provider clients).
    pub fn with_client(client: reqwest::Client, config: OpenAiConfig) -> Self {
        Self { client, config }
    }

    /// The configured chat model name.
    pub fn text_model(&self) -> &str {
        &self.config.text_model
    }

    /// POST `path` (relative to the base URL) with a JSON body and the
    /// bearer API key, parsing the JSON response into `T`.
    pub(crate) async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, OpenAiError> {
        let response = self
            .client
            .post(format!("{}{}", self.config.base_url, path))
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`OpenAiError::Api`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, OpenAiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(OpenAiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, OpenAiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
