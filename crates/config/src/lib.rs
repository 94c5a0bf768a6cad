// Configuration loading

pub mod error;
pub mod llm;
pub mod settings;

pub use error::ConfigError;
pub use llm::LlmConfig;
pub use settings::{LlmSettings, Settings};
