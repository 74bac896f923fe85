//! OpenAI-compatible provider implementation (OpenAI itself or any server
//! exposing `/v1/chat/completions`).

pub mod client;

pub use client::OpenAiCompatibleClient;
