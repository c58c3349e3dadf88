//! Error types for field registration and configuration

use std::path::PathBuf;

/// Field registry errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A field type is already registered under this name
    #[error("field type `{0}` is already registered")]
    AlreadyRegistered(String),

    /// No field type registered under this name
    #[error("unknown field type `{0}`")]
    UnknownField(String),
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Config file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for [`FieldConfig`](crate::FieldConfig)
    #[error("invalid config {path}: {source}")]
    Parse {
        /// Config file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },
}
