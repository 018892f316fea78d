//! The canonical representation of one conversation turn

use gridtalk_ai::ChatRole;

use crate::{
    codec::RawImage,
    error::{Error, Result},
};

/// Content of a turn: plain text, or text with an attached image.
///
/// Text is mandatory either way — an image without an accompanying question
/// is not a representable turn. The variant is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnContent {
    /// Text-only content
    Text { text: String },
    /// Text with an attached raw image (already validated by the codec)
    Image { text: String, image: RawImage },
}

impl TurnContent {
    /// The text of this content, regardless of variant
    pub fn text(&self) -> &str {
        match self {
            TurnContent::Text { text } => text,
            TurnContent::Image { text, .. } => text,
        }
    }

    /// The attached image, if any
    pub fn image(&self) -> Option<&RawImage> {
        match self {
            TurnContent::Text { .. } => None,
            TurnContent::Image { image, .. } => Some(image),
        }
    }
}

/// One message in the conversation, attributed to the user or the assistant.
/// Immutable once appended to a session store.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: ChatRole,
    pub content: TurnContent,
    /// Millisecond UNIX timestamp captured at construction
    pub timestamp: i64,
}

impl Turn {
    fn new(role: ChatRole, content: TurnContent) -> Result<Self> {
        if content.text().is_empty() {
            return Err(Error::Validation("turn text must not be empty".to_string()));
        }
        Ok(Self {
            role,
            content,
            timestamp: chrono::Utc::now().timestamp_millis(),
        })
    }

    /// Create a text-only user turn
    pub fn user(text: impl Into<String>) -> Result<Self> {
        Self::new(ChatRole::User, TurnContent::Text { text: text.into() })
    }

    /// Create a user turn with an attached image
    pub fn user_with_image(text: impl Into<String>, image: RawImage) -> Result<Self> {
        Self::new(
            ChatRole::User,
            TurnContent::Image {
                text: text.into(),
                image,
            },
        )
    }

    /// Create a text-only assistant turn
    pub fn assistant(text: impl Into<String>) -> Result<Self> {
        Self::new(
            ChatRole::Assistant,
            TurnContent::Text { text: text.into() },
        )
    }
}
