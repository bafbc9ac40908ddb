//! Prompt construction for the text and image generation calls.
//!
//! Both builders are pure string composition. The text prompt pins the
//! model to the `|||`-delimited four-field reply contract that
//! [`crate::story::parse_story_reply`] expects; the image prompt leads
//! with the user's own description so it dominates the illustration.

use crate::story::StoryDraft;

/// Build the text-generation prompt for a story request.
///
/// Embeds the user description and the maximum word count, and instructs
/// the model to reply with exactly four fields in fixed order, separated
/// by the literal `|||` delimiter, with a single genre.
pub fn build_story_prompt(description: &str, word_count: i32) -> String {
    format!(
        "Write a story for a kid based on the following details:\n\
         - Description: \"{description}\"\n\
         - Max word count: {word_count}\n\
         - The story should have a title, genre, a short summary, and engaging \
         content for kids. Content should have multiple meaningful paragraphs. \
         Return a string that has the title, genre, summary, and content.\n\
         - Each field in the string should be delimited with \"|||\" symbols.\n\
         - The result should have only one genre.\n\
         - Result should be in this order title|||genre|||summary|||content."
    )
}

/// Build the image-generation prompt from the user's description and the
/// synthesized draft.
///
/// The user's description is stated first and marked highest priority;
/// title, genre, and summary supply supporting detail. The requested
/// style is realistic and vibrant, not cartoonish, suitable for children.
pub fn build_image_prompt(description: &str, draft: &StoryDraft) -> String {
    format!(
        "Create a detailed and engaging image for a children's story based on the following:\n\
         - Kid's prompt: \"{description}\". This is the highest priority and should directly guide the image.\n\
         - Story Title: \"{title}\".\n\
         - Genre: \"{genre}\".\n\
         - Summary: \"{summary}\".\n\
         Ensure the image captures the essence of the story with relevant and clear visual \
         details, such as characters, actions, and the setting. \
         Use a realistic and vibrant art style (not cartoonish or overly abstract). \
         The image should align with the tone and mood of the story and be captivating for children.",
        title = draft.title,
        genre = draft.genre,
        summary = draft.summary,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> StoryDraft {
        StoryDraft {
            title: "The Brave Squirrel".to_string(),
            genre: "Adventure".to_string(),
            summary: "A squirrel crosses the great oak.".to_string(),
            content: "Once upon a time...".to_string(),
        }
    }

    #[test]
    fn story_prompt_embeds_description_and_word_count() {
        let prompt = build_story_prompt("a brave squirrel", 500);
        assert!(prompt.contains("\"a brave squirrel\""));
        assert!(prompt.contains("Max word count: 500"));
        assert!(prompt.contains("title|||genre|||summary|||content"));
        assert!(prompt.contains("only one genre"));
    }

    #[test]
    fn image_prompt_leads_with_user_description() {
        let prompt = build_image_prompt("a brave squirrel", &draft());
        let description_pos = prompt.find("a brave squirrel").unwrap();
        let title_pos = prompt.find("The Brave Squirrel").unwrap();
        assert!(description_pos < title_pos);
    }

    #[test]
    fn image_prompt_embeds_draft_fields_but_not_content() {
        let prompt = build_image_prompt("a brave squirrel", &draft());
        assert!(prompt.contains("The Brave Squirrel"));
        assert!(prompt.contains("Adventure"));
        assert!(prompt.contains("A squirrel crosses the great oak."));
        assert!(!prompt.contains("Once upon a time"));
    }
}
