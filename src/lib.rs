//! Server-side mediation layer for a generative AI service and a social
//! publishing service.
//!
//! Modules:
//! - `api`: Axum HTTP handlers and router setup used by the server binary.
//! - `genai`: Client for the generative AI REST API, including the
//!   submit/poll/download video workflow.
//! - `publish`: Publishing adapter that picks the feed or photo endpoint.
//! - `utils`: `data:` URI codec and upstream error normalization.
//! - `config`: Env-driven configuration loader.
//! - `error`: Common error type and alias.
//!
//! Re-exports are provided for common types: `Config`, `GenAiClient`,
//! `GraphClient`, `AppError`.
pub mod api;
pub mod config;
pub mod error;
pub mod genai;
pub mod publish;
pub mod utils;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use genai::{GenAiClient, GenerationRequest, VideoAsset};
pub use publish::{GraphClient, PublishRequest, PublishResult};
