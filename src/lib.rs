//! Startup Analyst - pitch document analysis backed by Google Cloud AI.
//!
//! Accepts startup pitch documents, extracts their text with Cloud Vision,
//! and asks a Gemini model on Vertex AI for structured investment analysis.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod google;
pub mod llm;
pub mod models;
pub mod ocr;
pub mod server;
pub mod services;
pub mod storage;
