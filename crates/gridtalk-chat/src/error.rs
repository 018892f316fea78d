//! Error types for gridtalk-chat

use thiserror::Error;

use crate::codec::CodecError;

/// Result type alias using gridtalk-chat Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the conversation core.
///
/// All of these resolve at the turn-loop boundary: the session store is never
/// left partially mutated, and the session stays usable after any of them.
#[derive(Error, Debug)]
pub enum Error {
    /// An upload could not be decoded; the pending image slot stays unset
    #[error("image codec error: {0}")]
    Codec(#[from] CodecError),

    /// The reasoning backend failed; no assistant turn was appended
    #[error(transparent)]
    Backend(#[from] gridtalk_ai::Error),

    /// Turn construction rejected before any state mutation
    #[error("validation error: {0}")]
    Validation(String),
}
