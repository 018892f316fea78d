//! Chat widgets

pub mod input_box;
pub mod message_list;
pub mod spinner;

pub use input_box::InputBox;
pub use message_list::{ChatMessage, MessageList, Speaker, content_height};
pub use spinner::Spinner;
