//! Image Crop Session
//!
//! The interactive half of the image-crop field. One
//! [`EditSessionController`] per mounted field sequences user steps
//! (select, remove, crop) and asynchronous [`MediaCatalog`] lookups into
//! committed [`StructuredValue`](imgcrop_value::StructuredValue)s.
//!
//! # Architecture
//!
//! ```text
//! user step ──▶ SessionState::apply ──▶ Transition { next, commit }
//!                     ▲                          │
//!   MediaCatalog ─────┘ (fetch results)          ▼
//!                                         ValueChanges (owner)
//! ```
//!
//! # Example
//!
//! ```rust
//! use imgcrop_session::{EditSessionController, InMemoryCatalog, SessionConfig};
//! use imgcrop_value::{MediaReference, StructuredValue};
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(InMemoryCatalog::new());
//! let (session, mut changes) =
//!     EditSessionController::new(StructuredValue::default(), catalog, SessionConfig::new());
//!
//! session.confirm_selection(Some(MediaReference::new(7, "A")));
//! session.remove_image();
//!
//! assert!(changes.try_recv().unwrap().media.is_some());
//! assert!(changes.try_recv().unwrap().media.is_none());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod state;
pub mod version;
pub mod view;

// Re-exports
pub use catalog::{InMemoryCatalog, MediaCatalog};
pub use config::{SessionConfig, DEFAULT_ADMIN_BASE_PATH, DEFAULT_LOCALE};
pub use controller::{EditSessionController, LoadOutcome, ResyncOutcome, ValueChanges};
pub use error::{CatalogError, TransitionError};
pub use state::{allowed_transitions, validate_transition, Action, EditPhase, SessionState, Transition};
pub use version::CropVersionClock;
pub use view::SessionView;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
