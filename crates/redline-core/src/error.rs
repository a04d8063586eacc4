//! Error types for redline-core
//!
//! Diffing itself never fails; errors only arise when loading configuration
//! or deserializing extracted documents.

/// Result type for redline-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in redline-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to parse {format} configuration: {message}")]
    ConfigParse { format: String, message: String },

    #[error("Unsupported configuration format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn config_parse(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigParse {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
