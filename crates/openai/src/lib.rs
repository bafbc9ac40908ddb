//! REST client for an OpenAI-compatible generation API.
//!
//! Wraps the three endpoints the story pipeline depends on: chat
//! completions (story text), image generation (illustrations), and
//! moderation (prompt screening), using [`reqwest`].

pub mod chat;
pub mod client;
pub mod images;
pub mod moderation;

pub use client::{OpenAiClient, OpenAiConfig, OpenAiError};
pub use moderation::ModerationVerdict;
