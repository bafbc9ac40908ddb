//! REST client for the Imgur image host.
//!
//! Generated-image providers return time-limited URLs; [`ImgurClient`]
//! copies each image to Imgur so the story record can carry a durable
//! URL instead.

use std::time::Duration;

use serde::Deserialize;

/// Default public API base URL.
const DEFAULT_BASE_URL: &str = "https://api.imgur.com";

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the Imgur API client.
#[derive(Debug, Clone)]
pub struct ImgurConfig {
    /// Anonymous-upload client ID (`Authorization: Client-ID ...`).
    pub client_id: String,
    /// Base URL (default: the public API).
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl ImgurConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var              | Required | Default                 |
    /// |----------------------|----------|-------------------------|
    /// | `IMGUR_CLIENT_ID`    | **yes**  | --                      |
    /// | `IMGUR_BASE_URL`     | no       | `https://api.imgur.com` |
    /// | `IMGUR_TIMEOUT_SECS` | no       | `30`                    |
    ///
    /// # Panics
    ///
    /// Panics if `IMGUR_CLIENT_ID` is not set.
    pub fn from_env() -> Self {
        let client_id = std::env::var("IMGUR_CLIENT_ID")
            .expect("IMGUR_CLIENT_ID must be set in the environment");

        let base_url = std::env::var("IMGUR_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());

        let timeout_secs: u64 = std::env::var("IMGUR_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .expect("IMGUR_TIMEOUT_SECS must be a valid u64");

        Self {
            client_id,
            base_url,
            timeout_secs,
        }
    }
}

/// Errors from the Imgur API layer.
#[derive(Debug, thiserror::Error)]
pub enum ImgurError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Imgur returned a non-2xx status code.
    #[error("Imgur API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// Imgur returned 2xx but no link for the uploaded image.
    #[error("Unexpected Imgur response: missing {0}")]
    MissingData(&'static str),
}

impl ImgurError {
    /// Whether a retry of the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ImgurError::Request(_) => true,
            ImgurError::Api { status, .. } => *status == 429 || *status >= 500,
            ImgurError::MissingData(_) => false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: UploadData,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    link: Option<String>,
}

/// HTTP client for Imgur uploads.
#[derive(Clone)]
pub struct ImgurClient {
    client: reqwest::Client,
    config: ImgurConfig,
}

impl ImgurClient {
    /// Create a new client with its own connection pool and the
    /// configured per-request timeout.
    pub fn new(config: ImgurConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to build HTTP client");
        Self { client, config }
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: ImgurConfig) -> Self {
        Self { client, config }
    }

    /// Upload the image behind a remote URL and return its durable link.
    ///
    /// Sends `POST /3/image` with `type = url`, so Imgur fetches the
    /// source image itself. A response without a link is an
    /// [`ImgurError::MissingData`].
    pub async fn rehost(&self, image_url: &str) -> Result<String, ImgurError> {
        let body = serde_json::json!({
            "image": image_url,
            "type": "url",
        });

        let response = self
            .client
            .post(format!("{}/3/image", self.config.base_url))
            .header(
                "Authorization",
                format!("Client-ID {}", self.config.client_id),
            )
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ImgurError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let upload: UploadResponse = response.json().await?;
        let link = upload
            .data
            .link
            .filter(|link| !link.is_empty())
            .ok_or(ImgurError::MissingData("image link"))?;

        tracing::debug!(%link, "Rehosted image");
        Ok(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overload_and_server_errors_are_transient() {
        assert!(ImgurError::Api {
            status: 429,
            body: String::new()
        }
        .is_transient());
        assert!(ImgurError::Api {
            status: 500,
            body: String::new()
        }
        .is_transient());
    }

    #[test]
    fn rejections_and_missing_links_are_permanent() {
        assert!(!ImgurError::Api {
            status: 403,
            body: String::new()
        }
        .is_transient());
        assert!(!ImgurError::MissingData("image link").is_transient());
    }
}
