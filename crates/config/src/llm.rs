// LLM configuration and credential resolution
//
// The API key comes from the GROQ_API_KEY environment variable (the binary
// loads a `.env` file into the environment before resolving). It is
// resolved once, up front, into an explicit LlmConfig that the client is
// constructed with. Keys are NEVER stored in settings.json.

use std::fmt;
use std::time::Duration;

use crate::error::ConfigError;
use crate::settings::LlmSettings;

/// Environment variable holding the provider credential
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

pub const DEFAULT_MODEL: &str = "llama3-70b-8192";
pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_TEMPERATURE: f32 = 0.0;
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 24_000;

/// The effective LLM configuration, fully resolved from settings and
/// environment.
#[derive(Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    /// Base URL; requests go to `{endpoint}/chat/completions`
    pub endpoint: String,
    pub timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_prompt_chars: usize,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &if self.api_key.is_empty() { "(empty)" } else { "(redacted)" })
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("max_prompt_chars", &self.max_prompt_chars)
            .finish()
    }
}

impl LlmConfig {
    /// Configuration with all defaults and the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
        }
    }

    /// Resolve from settings plus the process environment.
    pub fn resolve(settings: &LlmSettings) -> Result<Self, ConfigError> {
        Self::resolve_with(settings, |name| std::env::var(name).ok())
    }

    /// Resolve from settings with an explicit environment lookup.
    pub fn resolve_with<F>(settings: &LlmSettings, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = env(API_KEY_ENV)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ConfigError::MissingKey { var: API_KEY_ENV.to_string() })?;

        let mut config = Self::new(api_key);

        if !settings.model.trim().is_empty() {
            config.model = settings.model.trim().to_string();
        }
        if let Some(endpoint) = &settings.endpoint {
            config = config.with_endpoint(endpoint);
        }
        if let Some(secs) = settings.timeout_secs {
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    key: "llm.timeout_secs".into(),
                    message: "must be at least 1".into(),
                });
            }
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(max_tokens) = settings.max_tokens {
            config.max_tokens = max_tokens;
        }
        if let Some(temperature) = settings.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::Invalid {
                    key: "llm.temperature".into(),
                    message: format!("{temperature} is outside 0.0..=2.0"),
                });
            }
            config.temperature = temperature;
        }
        if let Some(max_chars) = settings.max_prompt_chars {
            config.max_prompt_chars = max_chars;
        }

        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Trailing slashes are dropped so paths can be appended.
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_prompt_chars(mut self, max_chars: usize) -> Self {
        self.max_prompt_chars = max_chars;
        self
    }
}
