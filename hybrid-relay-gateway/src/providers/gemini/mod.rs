//! Google Gemini provider implementation.

pub mod client;

pub use client::GeminiClient;
