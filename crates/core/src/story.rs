//! Story draft parsing and creation-request validation.
//!
//! The text model is instructed to reply with exactly four fields in the
//! fixed order title, genre, summary, content, separated by the literal
//! `|||` delimiter. [`parse_story_reply`] turns that raw reply into a
//! [`StoryDraft`], rejecting anything that does not match the contract.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Literal delimiter separating the four fields of a model reply.
pub const FIELD_DELIMITER: &str = "|||";

/// Number of fields a well-formed model reply must contain.
pub const FIELD_COUNT: usize = 4;

/// Field names in reply order, used in parse error messages.
const FIELD_NAMES: [&str; FIELD_COUNT] = ["title", "genre", "summary", "content"];

/// A leading `"Label:"` prefix: at least one non-colon character up to and
/// including the first colon, plus any whitespace that follows it.
static LABEL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^:]+:\s*").expect("label prefix pattern is valid"));

/// Structured draft parsed from the text model's delimited reply.
///
/// Transient: drafts exist only inside a pipeline run and are merged into
/// the persistent story record by the assembly stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryDraft {
    pub title: String,
    /// A single genre, never a list.
    pub genre: String,
    pub summary: String,
    pub content: String,
}

/// Errors raised when a model reply does not satisfy the field contract.
///
/// These are permanent failures: retrying the parse on the same reply can
/// never succeed, so callers must not retry them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoryParseError {
    /// The reply did not split into exactly four delimited segments.
    #[error("expected 4 '|||'-delimited fields, got {0}")]
    WrongFieldCount(usize),

    /// A segment was empty once its label prefix and whitespace were removed.
    #[error("story field '{0}' is empty")]
    EmptyField(&'static str),
}

/// Parse the text model's raw reply into a [`StoryDraft`].
///
/// Grammar: split on [`FIELD_DELIMITER`]; each segment has a leading
/// `"Label: "` prefix removed (everything up to and including the first
/// colon) and surrounding whitespace trimmed; the reply must yield exactly
/// four non-empty fields. The title additionally has stray double quotes
/// removed.
pub fn parse_story_reply(raw: &str) -> Result<StoryDraft, StoryParseError> {
    let segments: Vec<&str> = raw.split(FIELD_DELIMITER).collect();
    if segments.len() != FIELD_COUNT {
        return Err(StoryParseError::WrongFieldCount(segments.len()));
    }

    let mut fields = Vec::with_capacity(FIELD_COUNT);
    for (segment, name) in segments.iter().zip(FIELD_NAMES) {
        let field = strip_label(segment);
        if field.is_empty() {
            return Err(StoryParseError::EmptyField(name));
        }
        fields.push(field);
    }

    let [title, genre, summary, content] = <[String; FIELD_COUNT]>::try_from(fields)
        .map_err(|v| StoryParseError::WrongFieldCount(v.len()))?;

    let title = title.replace('"', "");
    if title.is_empty() {
        return Err(StoryParseError::EmptyField("title"));
    }

    Ok(StoryDraft {
        title,
        genre,
        summary,
        content,
    })
}

/// Remove a leading `"Label: "` prefix and surrounding whitespace.
///
/// A segment with no colon (or one starting with a colon) is kept intact
/// apart from trimming; a colon later in the text is untouched.
fn strip_label(segment: &str) -> String {
    LABEL_PREFIX.replace(segment, "").trim().to_string()
}

/// Validate the user-supplied fields of a story creation request.
///
/// - `description` must be non-empty after trimming.
/// - `word_count` must be positive.
/// - `uid` (the creator identifier) must be non-empty.
pub fn validate_story_request(
    description: &str,
    word_count: i32,
    uid: &str,
) -> Result<(), CoreError> {
    if description.trim().is_empty() {
        return Err(CoreError::Validation(
            "description must not be empty".to_string(),
        ));
    }
    if word_count <= 0 {
        return Err(CoreError::Validation(
            "wordCount must be greater than 0".to_string(),
        ));
    }
    if uid.trim().is_empty() {
        return Err(CoreError::Validation("uid must not be empty".to_string()));
    }
    Ok(())
}
