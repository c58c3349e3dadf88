//! Per-field options from the content schema

use imgcrop_value::CodecOptions;
use serde_json::Value;

/// Options attached to one field in the content schema
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldOptions {
    /// Crop variant shown as preview
    pub preview_crop_key: Option<String>,
    /// Storage codec switches
    pub codec: CodecOptions,
}

impl FieldOptions {
    /// Create default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse schema options
    ///
    /// Schema options are loosely typed; the preview crop key lives at
    /// `previewCrop.value`. Anything else is ignored.
    #[must_use]
    pub fn from_schema_options(options: &Value) -> Self {
        let preview_crop_key = options
            .get("previewCrop")
            .and_then(|opt| opt.get("value"))
            .and_then(Value::as_str)
            .filter(|key| !key.is_empty())
            .map(str::to_string);

        Self {
            preview_crop_key,
            codec: CodecOptions::default(),
        }
    }

    /// With preview crop key
    #[inline]
    #[must_use]
    pub fn with_preview_crop_key(mut self, key: impl Into<String>) -> Self {
        self.preview_crop_key = Some(key.into());
        self
    }

    /// With codec options
    #[inline]
    #[must_use]
    pub fn with_codec(mut self, codec: CodecOptions) -> Self {
        self.codec = codec;
        self
    }
}
