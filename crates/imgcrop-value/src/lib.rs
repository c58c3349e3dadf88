//! Image Crop Value
//!
//! The persisted half of the image-crop field:
//!
//! - [`StructuredValue`]: the decoded payload (`media`, `previewCropKey`, `lastCropVersion`)
//! - [`PropertyValueCodec`]: total, fallback-safe mapping between the generic
//!   node-property storage shape and [`StructuredValue`]
//! - [`NodeStore`]: the opaque storage backend boundary
//! - [`ImageCropContentType`]: read / write / remove of one field on a node
//!
//! # Example
//!
//! ```rust
//! use imgcrop_value::{Multiplicity, PropertyValueCodec};
//! use serde_json::json;
//!
//! let codec = PropertyValueCodec::new(Multiplicity::Single);
//! let value = codec.decode(Some(&json!(r#"{"media":{"id":"42","title":"Cover"}}"#)));
//! assert_eq!(value.media.unwrap().title, "Cover");
//!
//! // Anything malformed degrades to the empty value
//! assert!(codec.decode(Some(&json!("not json"))).is_empty());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod codec;
pub mod content_type;
pub mod error;
pub mod node;
pub mod types;

// Re-exports
pub use codec::{decode, encode, CodecOptions, PropertyValueCodec, StorageShape};
pub use content_type::{ImageCropContentType, Property, DEFAULT_ALIAS};
pub use error::StoreError;
pub use node::{InMemoryNode, NodeStore};
pub use types::{MediaId, MediaReference, Multiplicity, StructuredValue};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
