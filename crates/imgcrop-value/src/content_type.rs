//! Image crop content type
//!
//! Binds the codec to one named property on a node. Reading never writes
//! back to the node; a multi-valued property written while the node is being
//! read is rejected by some backends.

use crate::codec::{CodecOptions, PropertyValueCodec};
use crate::error::StoreError;
use crate::node::NodeStore;
use crate::types::{Multiplicity, StructuredValue};
use serde_json::Value;
use std::collections::BTreeMap;

/// Name the field type is registered under unless overridden
pub const DEFAULT_ALIAS: &str = "image_crop";

/// Host-side property holder for one field
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Property name on the node
    pub name: String,
    /// Single- or multi-valued storage
    pub multiplicity: Multiplicity,
    /// In-memory value; `None` means unset
    pub value: Option<StructuredValue>,
}

impl Property {
    /// Create unset property
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, multiplicity: Multiplicity) -> Self {
        Self {
            name: name.into(),
            multiplicity,
            value: None,
        }
    }

    /// With in-memory value
    #[inline]
    #[must_use]
    pub fn with_value(mut self, value: StructuredValue) -> Self {
        self.value = Some(value);
        self
    }
}

/// The image crop content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCropContentType {
    name: String,
    options: CodecOptions,
}

impl Default for ImageCropContentType {
    fn default() -> Self {
        Self::new(DEFAULT_ALIAS)
    }
}

impl ImageCropContentType {
    /// Create content type registered under `alias`
    #[inline]
    #[must_use]
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            name: alias.into(),
            options: CodecOptions::default(),
        }
    }

    /// With codec options
    #[inline]
    #[must_use]
    pub fn with_options(mut self, options: CodecOptions) -> Self {
        self.options = options;
        self
    }

    /// Registered name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Codec for a property
    #[inline]
    #[must_use]
    pub fn codec_for(&self, property: &Property) -> PropertyValueCodec {
        PropertyValueCodec::new(property.multiplicity).with_options(self.options)
    }

    /// Load the property's value from the node
    pub fn read<N>(&self, node: &N, property: &mut Property)
    where
        N: NodeStore + ?Sized,
    {
        if !node.has_property(&property.name) {
            property.value = Some(StructuredValue::default());
            return;
        }

        let raw = node.property_value(&property.name);
        property.value = Some(self.codec_for(property).decode(raw.as_ref()));
    }

    /// Store the property's value on the node
    ///
    /// # Errors
    /// [`StoreError`] from the backend.
    pub fn write<N>(&self, node: &mut N, property: &Property) -> Result<(), StoreError>
    where
        N: NodeStore + ?Sized,
    {
        let shape = self.codec_for(property).encode(property.value.as_ref());
        node.set_property(&property.name, Some(shape.into_value()))?;
        tracing::debug!("wrote image crop property `{}`", property.name);
        Ok(())
    }

    /// Clear the property on the node and unset the in-memory value
    ///
    /// # Errors
    /// [`StoreError`] from the backend; the in-memory value is left as is.
    pub fn remove<N>(&self, node: &mut N, property: &mut Property) -> Result<(), StoreError>
    where
        N: NodeStore + ?Sized,
    {
        if node.has_property(&property.name) {
            node.set_property(&property.name, None)?;
        }
        property.value = None;
        Ok(())
    }

    /// Value handed to templates
    #[must_use]
    pub fn content_data(&self, property: &Property) -> StructuredValue {
        property.value.clone().unwrap_or_default()
    }

    /// Value handed to the admin view
    #[must_use]
    pub fn view_data(&self, property: &Property) -> StructuredValue {
        self.content_data(property)
    }

    /// No type-specific parameters
    #[must_use]
    pub fn default_params(&self) -> BTreeMap<String, Value> {
        BTreeMap::new()
    }

    /// No initial value
    #[must_use]
    pub fn default_value(&self) -> Option<StructuredValue> {
        None
    }

    /// Whether the field is filled
    #[must_use]
    pub fn has_value(&self, property: &Property) -> bool {
        property.value.as_ref().is_some_and(|v| !v.is_empty())
    }
}
