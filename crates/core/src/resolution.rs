//! Illustration resolution tiers for the two-image synthesis pass.
//!
//! Every story gets exactly two illustrations from the same prompt: a
//! full-size image for the reader view and a small thumbnail for list
//! views. The two tiers are generated by independent provider calls.

/// Target resolution for a generated story illustration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageResolution {
    /// Full-size illustration shown in the story reader.
    Full,
    /// Small variant used by story cards and lists.
    Thumbnail,
}

impl ImageResolution {
    /// Provider-facing dimension string (`"<width>x<height>"`).
    pub fn dimensions(self) -> &'static str {
        match self {
            ImageResolution::Full => "1024x1024",
            ImageResolution::Thumbnail => "256x256",
        }
    }
}
