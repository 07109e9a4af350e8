//! Generative model access for document analysis.

mod client;
mod config;

pub use client::{GeminiClient, GenerativeModel, LlmError};
pub use config::{ModelConfig, SamplingProfile};
