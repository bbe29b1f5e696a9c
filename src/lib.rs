//! DermAI Coach: a small marketing site with an AI-backed daily skin check-in.
//!
//! The check-in pipeline (`prompt` → `gemini` → `response`) is usable on its own; the `web`
//! feature adds the axum site that serves it.

pub mod analyzer;
#[cfg(feature = "web")]
pub mod content;
pub mod gemini;
pub mod page;
pub mod prompt;
pub mod response;
#[cfg(feature = "web")]
pub mod web;

pub use analyzer::{AnalysisInput, AnalysisState, Analyzer, ImageUpload, SessionBoard, SubmitError};
pub use gemini::{AnalysisBackend, GeminiClient, GeminiConfig, GeminiError};
pub use page::{Navigation, Page, ScrollTarget, navigate};
pub use response::{Resource, WellnessResponse, parse_reply};
