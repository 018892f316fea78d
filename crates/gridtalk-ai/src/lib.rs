//! gridtalk-ai: Reasoning backend interface
//!
//! This crate defines the narrow interface between the chat front-end and the
//! reasoning backend ("orchestrator"), plus a Groq-hosted implementation of it.

pub mod error;
pub mod models;
pub mod orchestrator;
pub mod types;

pub use error::{Error, Result};
pub use orchestrator::{GroqOrchestrator, Orchestrate};
pub use types::*;
