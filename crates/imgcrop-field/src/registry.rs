//! Field type registry
//!
//! Provides [`FieldRegistry`] for looking up field types by name and
//! mounting them. The admin shell registers `image_crop` once at start-up
//! through [`install`].

use crate::error::RegistryError;
use crate::mount::{FieldMount, MountedField};
use imgcrop_value::{ImageCropContentType, DEFAULT_ALIAS};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Builds a mounted field from mount parameters
pub type FieldFactory = Arc<dyn Fn(FieldMount) -> MountedField + Send + Sync>;

/// A registered field type
#[derive(Clone)]
pub struct FieldDescriptor {
    name: String,
    content_type: ImageCropContentType,
    factory: FieldFactory,
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

impl FieldDescriptor {
    /// Descriptor with a custom factory
    #[must_use]
    pub fn new(content_type: ImageCropContentType, factory: FieldFactory) -> Self {
        Self {
            name: content_type.name().to_string(),
            content_type,
            factory,
        }
    }

    /// The built-in `image_crop` field
    #[must_use]
    pub fn image_crop() -> Self {
        Self::for_content_type(ImageCropContentType::default())
    }

    /// Descriptor mounting `content_type` with the default factory
    #[must_use]
    pub fn for_content_type(content_type: ImageCropContentType) -> Self {
        let mounted_as = content_type.clone();
        let factory: FieldFactory =
            Arc::new(move |mount| MountedField::mount(mounted_as.clone(), mount));
        Self::new(content_type, factory)
    }

    /// Registered name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Content type
    #[inline]
    #[must_use]
    pub fn content_type(&self) -> &ImageCropContentType {
        &self.content_type
    }

    /// Mount a field of this type
    #[must_use]
    pub fn mount(&self, mount: FieldMount) -> MountedField {
        (self.factory)(mount)
    }
}

/// Registry of field types by name
#[derive(Debug, Default, Clone)]
pub struct FieldRegistry {
    fields: HashMap<String, FieldDescriptor>,
}

impl FieldRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    /// Create registry with the built-in `image_crop` field
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .fields
            .insert(DEFAULT_ALIAS.to_string(), FieldDescriptor::image_crop());
        registry
    }

    /// Register a field type
    ///
    /// # Errors
    /// [`RegistryError::AlreadyRegistered`] if the name is taken.
    pub fn register(&mut self, descriptor: FieldDescriptor) -> Result<(), RegistryError> {
        if self.fields.contains_key(descriptor.name()) {
            return Err(RegistryError::AlreadyRegistered(descriptor.name().to_string()));
        }
        tracing::info!("registered field type `{}`", descriptor.name());
        self.fields.insert(descriptor.name().to_string(), descriptor);
        Ok(())
    }

    /// Get field type
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    /// Check if field type exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Remove field type
    #[inline]
    pub fn remove(&mut self, name: &str) -> Option<FieldDescriptor> {
        self.fields.remove(name)
    }

    /// List all registered names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get number of registered field types
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Mount a field of type `name`
    ///
    /// # Errors
    /// [`RegistryError::UnknownField`] if nothing is registered under `name`.
    pub fn mount(&self, name: &str, mount: FieldMount) -> Result<MountedField, RegistryError> {
        self.get(name)
            .map(|descriptor| descriptor.mount(mount))
            .ok_or_else(|| RegistryError::UnknownField(name.to_string()))
    }
}

/// Register the `image_crop` field unless the shell is already initialized
///
/// Returns `true` if the field was registered by this call.
pub fn install(registry: &mut FieldRegistry, initialized: bool) -> bool {
    if initialized {
        tracing::debug!("field registry already initialized, skipping `{}`", DEFAULT_ALIAS);
        return false;
    }
    match registry.register(FieldDescriptor::image_crop()) {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!("{}", e);
            false
        }
    }
}

static GLOBAL: Lazy<RwLock<FieldRegistry>> = Lazy::new(|| RwLock::new(FieldRegistry::with_defaults()));

/// Process-wide registry, created with the built-in field on first use
#[must_use]
pub fn global() -> &'static RwLock<FieldRegistry> {
    &GLOBAL
}
