//! File configuration
//!
//! ```toml
//! [session]
//! preview_crop_key = "wide"
//! locale = "de"
//! admin_base_path = "/admin"
//!
//! [codec]
//! persist_crop_version = false
//! ```

use crate::error::ConfigError;
use crate::options::FieldOptions;
use imgcrop_session::SessionConfig;
use imgcrop_value::CodecOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Field configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Edit session settings
    pub session: SessionConfig,
    /// Storage codec settings
    pub codec: CodecOptions,
}

impl FieldConfig {
    /// Load from a TOML file
    ///
    /// # Errors
    /// [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("loaded field config from {}", path.display());
        Ok(config)
    }

    /// Field options equivalent to this configuration
    #[must_use]
    pub fn field_options(&self) -> FieldOptions {
        FieldOptions {
            preview_crop_key: self.session.preview_crop_key.clone(),
            codec: self.codec,
        }
    }
}
