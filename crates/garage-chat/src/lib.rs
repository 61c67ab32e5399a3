//! Grounded answer generation for the chat endpoint.
//!
//! The retrieval bundle is the source of truth. An external LLM may phrase
//! it; when that call is unavailable or misbehaves a templated answer is
//! built from the same evidence instead.

pub mod answer;
pub mod config;
pub mod providers;
pub mod types;

pub use answer::{generate_answer, AnswerOutcome, AnswerRequest};
pub use config::{LLMConfig, Resolution};
pub use types::*;
