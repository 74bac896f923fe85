pub mod config;

pub use config::{
    Config, ConfigError, GeminiSettings, HttpSettings, OpenAiSettings, ProvidersSettings,
    RepliesSettings, Secrets, SecretsError, Settings, SettingsError, TelegramSettings,
    load_dotenv,
};
