pub mod adapter;
pub mod gemini;
pub mod openai_compatible;
pub mod provider;

pub use adapter::{ProviderAdapter, ProviderFailure, ProviderSlot};
pub use provider::{Provider, ProviderError, ProviderResponse, ProviderUsage, extract_text};
