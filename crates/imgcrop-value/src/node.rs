//! Node store boundary
//!
//! The generic node/document backend is opaque: this crate only needs to ask
//! whether a property exists, read its raw value and overwrite or clear it.

use crate::error::StoreError;
use serde_json::Value;
use std::collections::BTreeMap;

/// Generic node-property store
pub trait NodeStore {
    /// Whether the node carries the property
    fn has_property(&self, name: &str) -> bool;

    /// Raw property value
    fn property_value(&self, name: &str) -> Option<Value>;

    /// Overwrite the property; `None` clears it
    ///
    /// # Errors
    /// Backend-specific [`StoreError`].
    fn set_property(&mut self, name: &str, value: Option<Value>) -> Result<(), StoreError>;
}

/// In-memory node, used by the CLI and tests
#[derive(Debug, Clone, Default)]
pub struct InMemoryNode {
    properties: BTreeMap<String, Value>,
    read_only: bool,
}

impl InMemoryNode {
    /// Create empty node
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Node that rejects every write
    #[inline]
    #[must_use]
    pub fn read_only() -> Self {
        Self {
            properties: BTreeMap::new(),
            read_only: true,
        }
    }

    /// With a raw property value
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// Number of stored properties
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// True if nothing is stored
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl NodeStore for InMemoryNode {
    fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    fn property_value(&self, name: &str) -> Option<Value> {
        self.properties.get(name).cloned()
    }

    fn set_property(&mut self, name: &str, value: Option<Value>) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::ReadOnly {
                property: name.to_string(),
            });
        }

        match value {
            Some(value) => {
                self.properties.insert(name.to_string(), value);
            }
            None => {
                self.properties.remove(name);
            }
        }
        Ok(())
    }
}
