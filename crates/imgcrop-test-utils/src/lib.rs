//! Testing utilities for the image crop field workspace
//!
//! Shared catalog doubles and fixtures.

#![allow(missing_docs)]

use async_trait::async_trait;
use imgcrop_session::{CatalogError, EditSessionController, MediaCatalog, SessionConfig, ValueChanges};
use imgcrop_value::{MediaId, MediaReference, StructuredValue};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;

/// Catalog whose answers can be scripted per call
///
/// - [`fail_next`](Self::fail_next) queues errors returned by the next fetches
/// - [`hold`](Self::hold) parks the next fetch of an id until the returned
///   sender fires (or is dropped); the record is looked up after release
#[derive(Debug, Default)]
pub struct ScriptedCatalog {
    media: Mutex<HashMap<MediaId, MediaReference>>,
    failures: Mutex<VecDeque<CatalogError>>,
    holds: Mutex<HashMap<MediaId, oneshot::Receiver<()>>>,
    calls: AtomicUsize,
}

impl ScriptedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_media(media: impl IntoIterator<Item = MediaReference>) -> Self {
        let catalog = Self::new();
        for m in media {
            catalog.insert(m);
        }
        catalog
    }

    pub fn insert(&self, media: MediaReference) {
        self.media.lock().insert(media.id.clone(), media);
    }

    pub fn delete(&self, id: &MediaId) {
        self.media.lock().remove(id);
    }

    pub fn fail_next(&self, error: CatalogError) {
        self.failures.lock().push_back(error);
    }

    pub fn hold(&self, id: impl Into<MediaId>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.holds.lock().insert(id.into(), rx);
        tx
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaCatalog for ScriptedCatalog {
    async fn fetch_by_id(&self, id: &MediaId) -> Result<Option<MediaReference>, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let held = self.holds.lock().remove(id);
        if let Some(release) = held {
            let _ = release.await;
        }

        if let Some(error) = self.failures.lock().pop_front() {
            return Err(error);
        }
        Ok(self.media.lock().get(id).cloned())
    }
}

pub fn media(id: u64) -> MediaReference {
    MediaReference::new(id, format!("Media {id}"))
        .with_url(format!("/uploads/media/{id}.jpg"))
        .with_admin_url(format!("/admin/uploads/media/{id}.jpg"))
        .with_thumbnail("wide", format!("/uploads/media/wide/{id}.jpg"))
}

pub fn cover() -> MediaReference {
    MediaReference::new("42", "Cover")
}

pub fn value_with(media: MediaReference) -> StructuredValue {
    StructuredValue::with_media(media)
}

pub fn session(
    initial: StructuredValue,
    catalog: &Arc<ScriptedCatalog>,
) -> (EditSessionController, ValueChanges) {
    let catalog: Arc<dyn MediaCatalog> = catalog.clone();
    EditSessionController::new(initial, catalog, SessionConfig::new())
}

/// Collect every value committed so far
pub fn drain(changes: &mut ValueChanges) -> Vec<StructuredValue> {
    let mut out = Vec::new();
    while let Ok(value) = changes.try_recv() {
        out.push(value);
    }
    out
}
