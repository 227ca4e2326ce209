//! Error types for swath

use thiserror::Error;

/// The main error type for swath operations
#[derive(Debug, Error)]
pub enum SwathError {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("TOML parse error: {0}")]
    TomlParseError(String),
}

/// Result type alias for swath operations
pub type Result<T> = std::result::Result<T, SwathError>;

impl From<toml::de::Error> for SwathError {
    fn from(err: toml::de::Error) -> Self {
        SwathError::TomlParseError(err.to_string())
    }
}
