//! CLI Exit Code Registry
//!
//! Single source of truth for `autosales` exit codes. Scripts rely on them.
//!
//! | Range   | Domain  | Description                                 |
//! |---------|---------|---------------------------------------------|
//! | 0       | -       | Success                                     |
//! | 1       | -       | General error                               |
//! | 2       | -       | Usage error (clap)                          |
//! | 3-9     | data    | Sales CSV unreadable or malformed           |
//! | 10-19   | config  | Credential and settings problems            |
//! | 20-29   | llm     | Provider call failures                      |
//! | 30-39   | audit   | Verification log problems                   |

use autosales_config::ConfigError;
use autosales_core::LoadError;
use autosales_llm::{AuditError, LlmError};

// =============================================================================
// Universal (0-2)
// =============================================================================

pub const EXIT_SUCCESS: u8 = 0;

/// Unspecified failure. Prefer a specific code.
pub const EXIT_ERROR: u8 = 1;

/// Bad arguments. clap exits with this itself.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Data (3-9)
// =============================================================================

/// Data file missing or unreadable.
pub const EXIT_DATA_IO: u8 = 3;

/// Missing column, bad or negative number, overflowing totals, malformed CSV.
pub const EXIT_DATA_FORMAT: u8 = 4;

// =============================================================================
// Config (10-19)
// =============================================================================

/// GROQ_API_KEY unset or blank.
pub const EXIT_MISSING_KEY: u8 = 10;

/// settings.json unreadable, malformed, or out of range.
pub const EXIT_SETTINGS: u8 = 11;

// =============================================================================
// LLM (20-29)
// =============================================================================

pub const EXIT_LLM_NETWORK: u8 = 20;
pub const EXIT_LLM_TIMEOUT: u8 = 21;

/// Provider answered with a non-2xx status.
pub const EXIT_LLM_PROVIDER: u8 = 22;

/// 2xx body without usable content.
pub const EXIT_LLM_INVALID_RESPONSE: u8 = 23;

/// Empty or oversized prompt; nothing was sent.
pub const EXIT_PROMPT_REJECTED: u8 = 24;

/// Connectivity check answered without the expected token.
pub const EXIT_CONNECTIVITY_MISMATCH: u8 = 25;

// =============================================================================
// Audit (30-39)
// =============================================================================

pub const EXIT_AUDIT_WRITE: u8 = 30;
pub const EXIT_AUDIT_READ: u8 = 31;

pub fn load_exit_code(err: &LoadError) -> u8 {
    match err {
        LoadError::Io { .. } => EXIT_DATA_IO,
        LoadError::Format(_) => EXIT_DATA_FORMAT,
    }
}

pub fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::MissingKey { .. } => EXIT_MISSING_KEY,
        ConfigError::Read { .. } | ConfigError::Parse { .. } | ConfigError::Invalid { .. } => EXIT_SETTINGS,
    }
}

pub fn llm_exit_code(err: &LlmError) -> u8 {
    match err {
        LlmError::EmptyPrompt | LlmError::PromptTooLong { .. } => EXIT_PROMPT_REJECTED,
        LlmError::MissingCredential => EXIT_MISSING_KEY,
        LlmError::Network(_) => EXIT_LLM_NETWORK,
        LlmError::Timeout(_) => EXIT_LLM_TIMEOUT,
        LlmError::Provider { .. } => EXIT_LLM_PROVIDER,
        LlmError::InvalidResponse(_) => EXIT_LLM_INVALID_RESPONSE,
    }
}

pub fn audit_exit_code(err: &AuditError) -> u8 {
    match err {
        AuditError::Io { .. } | AuditError::Serialize(_) => EXIT_AUDIT_WRITE,
        AuditError::Parse { .. } => EXIT_AUDIT_READ,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn llm_failures_have_distinct_codes() {
        let codes = [
            llm_exit_code(&LlmError::Network("refused".into())),
            llm_exit_code(&LlmError::Timeout("10s".into())),
            llm_exit_code(&LlmError::Provider { status: 500, message: "x".into() }),
            llm_exit_code(&LlmError::InvalidResponse("empty".into())),
            llm_exit_code(&LlmError::EmptyPrompt),
            config_exit_code(&ConfigError::MissingKey { var: "GROQ_API_KEY".into() }),
        ];
        let mut unique = codes.to_vec();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), codes.len(), "{codes:?}");
        assert!(!codes.contains(&EXIT_SUCCESS));
    }

    #[test]
    fn overflowing_totals_are_a_format_error() {
        let err = LoadError::Format(autosales_core::FormatError::OutOfRange {
            line: 3,
            column: "Quantity".into(),
            value: "10000000000000000000".into(),
        });
        assert_eq!(load_exit_code(&err), EXIT_DATA_FORMAT);
    }

    #[test]
    fn missing_credential_matches_missing_key() {
        assert_eq!(llm_exit_code(&LlmError::MissingCredential), EXIT_MISSING_KEY);
    }
}
