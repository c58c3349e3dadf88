//! Session configuration

use imgcrop_value::MediaId;
use serde::{Deserialize, Serialize};

/// Locale used when the host provides none
pub const DEFAULT_LOCALE: &str = "en";

/// Admin shell mount point
pub const DEFAULT_ADMIN_BASE_PATH: &str = "/admin";

/// Per-field session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Crop variant shown as preview; `None` shows the primary image
    pub preview_crop_key: Option<String>,
    /// Active admin locale
    pub locale: Option<String>,
    /// Base path of the admin shell, used for edit links
    pub admin_base_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            preview_crop_key: None,
            locale: None,
            admin_base_path: DEFAULT_ADMIN_BASE_PATH.to_string(),
        }
    }
}

impl SessionConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With preview crop key
    #[inline]
    #[must_use]
    pub fn with_preview_crop_key(mut self, key: impl Into<String>) -> Self {
        self.preview_crop_key = Some(key.into());
        self
    }

    /// With locale
    #[inline]
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// With admin base path
    #[inline]
    #[must_use]
    pub fn with_admin_base_path(mut self, path: impl Into<String>) -> Self {
        self.admin_base_path = path.into();
        self
    }

    /// Active locale, falling back to [`DEFAULT_LOCALE`]
    #[inline]
    #[must_use]
    pub fn locale(&self) -> &str {
        self.locale
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LOCALE)
    }

    /// Media detail page in the admin shell
    #[must_use]
    pub fn edit_url(&self, id: &MediaId) -> String {
        format!(
            "{}/#/media/{}/{}/details",
            self.admin_base_path.trim_end_matches('/'),
            self.locale(),
            id
        )
    }
}
