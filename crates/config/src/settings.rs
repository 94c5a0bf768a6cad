// Application settings
// Loaded from ~/.config/autosales/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const DEFAULT_DATA_PATH: &str = "data/car_sales.csv";
pub const AUDIT_LOG_FILENAME: &str = "llm_audit.jsonl";

/// LLM-specific settings. Unset fields fall back to provider defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Model identifier (empty = default model)
    pub model: String,

    /// Base URL of the OpenAI-compatible API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Longest prompt accepted, in characters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_prompt_chars: Option<usize>,
}

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Sales CSV read by the pipeline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_path: Option<PathBuf>,

    /// Append-only verification log
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_log_path: Option<PathBuf>,

    pub llm: LlmSettings,
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("autosales");
        config_dir.join("settings.json")
    }

    /// Load settings from the default location. A missing file means defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&contents).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse settings JSON. Lines starting with `//` are treated as comments.
    pub fn from_json(contents: &str) -> Result<Self, String> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        if cleaned.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_json::from_str(&cleaned).map_err(|e| e.to_string())
    }

    pub fn effective_data_path(&self) -> PathBuf {
        self.data_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH))
    }

    /// Audit log location: setting, else the platform data dir, else the
    /// working directory.
    pub fn effective_audit_log_path(&self) -> PathBuf {
        if let Some(path) = &self.audit_log_path {
            return path.clone();
        }
        match dirs::data_local_dir() {
            Some(dir) => dir.join("autosales").join(AUDIT_LOG_FILENAME),
            None => PathBuf::from(AUDIT_LOG_FILENAME),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.effective_data_path(), PathBuf::from("data/car_sales.csv"));
    }

    #[test]
    fn partial_llm_settings() {
        let json = r#"{
            // local overrides
            "data_path": "/srv/sales.csv",
            "llm": { "model": "llama3-8b-8192", "timeout_secs": 30 }
        }"#;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(settings.effective_data_path(), PathBuf::from("/srv/sales.csv"));
        assert_eq!(settings.llm.model, "llama3-8b-8192");
        assert_eq!(settings.llm.timeout_secs, Some(30));
        assert!(settings.llm.endpoint.is_none());
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        let err = Settings::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn audit_log_path_override() {
        let settings = Settings {
            audit_log_path: Some(PathBuf::from("/tmp/audit.jsonl")),
            ..Default::default()
        };
        assert_eq!(settings.effective_audit_log_path(), PathBuf::from("/tmp/audit.jsonl"));
    }

    #[test]
    fn default_audit_log_filename() {
        let path = Settings::default().effective_audit_log_path();
        assert!(path.to_string_lossy().ends_with(AUDIT_LOG_FILENAME));
    }

    #[test]
    fn config_path_names_app() {
        let path = Settings::config_path();
        assert!(path.to_string_lossy().contains("autosales"));
        assert!(path.to_string_lossy().ends_with("settings.json"));
    }
}
