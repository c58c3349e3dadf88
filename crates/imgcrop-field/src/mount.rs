//! Mounting a field from raw storage

use crate::options::FieldOptions;
use imgcrop_session::{EditSessionController, MediaCatalog, SessionConfig, ValueChanges};
use imgcrop_value::{
    ImageCropContentType, Multiplicity, NodeStore, Property, PropertyValueCodec, StoreError,
};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Everything a factory needs to mount one field
#[derive(Clone)]
pub struct FieldMount {
    /// Raw stored property value
    pub raw: Option<Value>,
    /// Storage multiplicity of the property
    pub multiplicity: Multiplicity,
    /// Catalog used by the edit session
    pub catalog: Arc<dyn MediaCatalog>,
    /// Schema options
    pub options: FieldOptions,
    /// Active admin locale
    pub locale: Option<String>,
}

impl fmt::Debug for FieldMount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMount")
            .field("raw", &self.raw)
            .field("multiplicity", &self.multiplicity)
            .field("options", &self.options)
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}

impl FieldMount {
    /// Mount an unset single-valued field
    #[must_use]
    pub fn new(catalog: Arc<dyn MediaCatalog>) -> Self {
        Self {
            raw: None,
            multiplicity: Multiplicity::Single,
            catalog,
            options: FieldOptions::default(),
            locale: None,
        }
    }

    /// Mount from the property `name` on `node`
    #[must_use]
    pub fn from_node<N>(node: &N, name: &str, catalog: Arc<dyn MediaCatalog>) -> Self
    where
        N: NodeStore + ?Sized,
    {
        Self {
            raw: node.property_value(name),
            ..Self::new(catalog)
        }
    }

    /// With raw stored value
    #[inline]
    #[must_use]
    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = Some(raw);
        self
    }

    /// With multiplicity
    #[inline]
    #[must_use]
    pub fn with_multiplicity(mut self, multiplicity: Multiplicity) -> Self {
        self.multiplicity = multiplicity;
        self
    }

    /// With schema options
    #[inline]
    #[must_use]
    pub fn with_options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }

    /// With locale
    #[inline]
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    fn session_config(&self) -> SessionConfig {
        let mut config = SessionConfig::new();
        if let Some(key) = &self.options.preview_crop_key {
            config = config.with_preview_crop_key(key.clone());
        }
        if let Some(locale) = &self.locale {
            config = config.with_locale(locale.clone());
        }
        config
    }
}

/// A mounted field: its edit session plus the codec it was decoded with
#[derive(Debug)]
pub struct MountedField {
    /// Edit session
    pub controller: EditSessionController,
    /// Committed values
    pub changes: ValueChanges,
    /// Codec matching the property's storage shape
    pub codec: PropertyValueCodec,
    content_type: ImageCropContentType,
}

impl MountedField {
    /// Decode the raw value and start an edit session
    ///
    /// The session is not initialized; call
    /// [`EditSessionController::initialize`] to fetch the selected media.
    #[must_use]
    pub fn mount(content_type: ImageCropContentType, mount: FieldMount) -> Self {
        let config = mount.session_config();
        let codec = PropertyValueCodec::new(mount.multiplicity).with_options(mount.options.codec);
        let initial = codec.decode(mount.raw.as_ref());
        let (controller, changes) = EditSessionController::new(initial, mount.catalog, config);

        tracing::debug!(
            "mounted {} field, media {:?}",
            content_type.name(),
            controller.value().media_id()
        );

        Self {
            controller,
            changes,
            codec,
            content_type: content_type.with_options(mount.options.codec),
        }
    }

    /// Content type backing this field
    #[inline]
    #[must_use]
    pub fn content_type(&self) -> &ImageCropContentType {
        &self.content_type
    }

    /// Write the current value to the property `name` on `node`
    ///
    /// # Errors
    /// [`StoreError`] from the backend.
    pub fn persist<N>(&self, node: &mut N, name: &str) -> Result<(), StoreError>
    where
        N: NodeStore + ?Sized,
    {
        let property = Property::new(name, self.codec.multiplicity()).with_value(self.controller.value());
        self.content_type.write(node, &property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgcrop_session::InMemoryCatalog;
    use imgcrop_value::{InMemoryNode, MediaReference};
    use serde_json::json;

    fn catalog() -> Arc<dyn MediaCatalog> {
        Arc::new(InMemoryCatalog::new())
    }

    #[test]
    fn mount_decodes_raw_value() {
        let mount = FieldMount::new(catalog())
            .with_raw(json!([r#"{"media":{"id":5,"title":"Five"}}"#]))
            .with_multiplicity(Multiplicity::Multiple);

        let field = MountedField::mount(ImageCropContentType::default(), mount);

        assert_eq!(field.controller.value().media, Some(MediaReference::new(5u64, "Five")));
        assert!(field.codec.multiplicity().is_multiple());
    }

    #[test]
    fn mount_passes_options_to_session() {
        let mount = FieldMount::new(catalog())
            .with_options(FieldOptions::new().with_preview_crop_key("wide"))
            .with_locale("de");

        let field = MountedField::mount(ImageCropContentType::default(), mount);
        let config = field.controller.config();

        assert_eq!(config.preview_crop_key.as_deref(), Some("wide"));
        assert_eq!(config.locale(), "de");
    }

    #[test]
    fn persist_writes_current_value() {
        let mut node = InMemoryNode::new();
        let mut field = MountedField::mount(ImageCropContentType::default(), FieldMount::new(catalog()));

        field.controller.confirm_selection(Some(MediaReference::new("7", "A")));
        assert!(field.changes.try_recv().is_ok());
        field.persist(&mut node, "hero").unwrap();

        let stored = node.property_value("hero");
        assert!(stored.as_ref().is_some_and(Value::is_string));
        let decoded = field.codec.decode(stored.as_ref());
        assert_eq!(decoded.media, Some(MediaReference::new("7", "A")));
    }

    #[test]
    fn persist_surfaces_store_errors() {
        let mut node = InMemoryNode::read_only();
        let field = MountedField::mount(ImageCropContentType::default(), FieldMount::new(catalog()));
        assert!(field.persist(&mut node, "hero").is_err());
    }
}
