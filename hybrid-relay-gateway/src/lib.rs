pub mod chain;
pub mod prompt;
pub mod providers;
pub mod telegram;

pub use chain::{Reply, ReplySource, ResponderChain};
pub use prompt::Prompt;
pub use providers::{
    Provider, ProviderAdapter, ProviderError, ProviderFailure, ProviderResponse, ProviderSlot,
    ProviderUsage,
};
