//! Storyforge domain core.
//!
//! Pure domain logic shared across the workspace: common types, the
//! domain error taxonomy, the generated-story parser, prompt builders,
//! and illustration resolution tiers. No I/O lives here.

pub mod error;
pub mod prompt;
pub mod resolution;
pub mod story;
pub mod types;
