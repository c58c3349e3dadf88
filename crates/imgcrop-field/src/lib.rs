//! Image Crop Field
//!
//! Registration and mounting of the `image_crop` field type:
//!
//! - [`FieldRegistry`]: field types by name, with [`install`] as the
//!   start-up hook and [`global`] as the process-wide instance
//! - [`FieldOptions`]: per-field schema options (`previewCrop.value`)
//! - [`MountedField`]: a decoded value plus its edit session, persisted back
//!   through the content type
//! - [`FieldConfig`]: TOML configuration
//!
//! # Example
//!
//! ```rust
//! use imgcrop_field::{FieldMount, FieldRegistry};
//! use imgcrop_session::{InMemoryCatalog, MediaCatalog};
//! use imgcrop_value::InMemoryNode;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let catalog: Arc<dyn MediaCatalog> = Arc::new(InMemoryCatalog::new());
//! let registry = FieldRegistry::with_defaults();
//!
//! let mount = FieldMount::new(catalog).with_raw(json!(r#"{"media":{"id":"42","title":"Cover"}}"#));
//! let field = registry.mount("image_crop", mount).unwrap();
//! field.controller.remove_image();
//!
//! let mut node = InMemoryNode::new();
//! field.persist(&mut node, "cover").unwrap();
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod mount;
pub mod options;
pub mod registry;

// Re-exports
pub use config::FieldConfig;
pub use error::{ConfigError, RegistryError};
pub use mount::{FieldMount, MountedField};
pub use options::FieldOptions;
pub use registry::{global, install, FieldDescriptor, FieldFactory, FieldRegistry};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
