use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Credential environment variable unset or empty.
    #[error("{var} is not set")]
    MissingKey { var: String },
    #[error("cannot read settings file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    /// A setting is present but out of range.
    #[error("invalid setting {key}: {message}")]
    Invalid { key: String, message: String },
}
