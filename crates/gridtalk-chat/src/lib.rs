//! gridtalk-chat: Conversation state and multimodal turn model
//!
//! This crate holds the conversation core: the turn model, the image codec,
//! history windowing, the per-session store, and the turn loop that drives a
//! submission through the reasoning backend and back into the store.

pub mod codec;
pub mod driver;
pub mod error;
pub mod session;
pub mod turn;
pub mod window;

pub use codec::{CodecError, RawImage};
pub use driver::{ImageRetention, LoopState, Render, TurnLoop, TurnLoopConfig, one_shot};
pub use error::{Error, Result};
pub use session::{PendingImage, SessionStore};
pub use turn::{Turn, TurnContent};
pub use window::window;
