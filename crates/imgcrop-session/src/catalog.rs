//! Media catalog boundary
//!
//! The controller only ever fetches a record by id and reacts to the three
//! possible results: a record, "not found", or a failure.

use crate::error::CatalogError;
use async_trait::async_trait;
use imgcrop_value::{MediaId, MediaReference};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Resolves media ids to catalog records
#[async_trait]
pub trait MediaCatalog: Send + Sync {
    /// Fetch a record by id
    ///
    /// Returns `Ok(None)` when the catalog has no such media.
    ///
    /// # Errors
    /// [`CatalogError`] on transport or availability failure.
    async fn fetch_by_id(&self, id: &MediaId) -> Result<Option<MediaReference>, CatalogError>;
}

/// Catalog backed by a map
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    media: RwLock<HashMap<MediaId, MediaReference>>,
}

impl InMemoryCatalog {
    /// Create empty catalog
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record
    pub fn insert(&self, media: MediaReference) {
        self.media.write().insert(media.id.clone(), media);
    }

    /// Delete a record
    pub fn remove(&self, id: &MediaId) -> Option<MediaReference> {
        self.media.write().remove(id)
    }

    /// Check if a record exists
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &MediaId) -> bool {
        self.media.read().contains_key(id)
    }

    /// Number of records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.media.read().len()
    }

    /// Check if catalog is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.media.read().is_empty()
    }
}

impl FromIterator<MediaReference> for InMemoryCatalog {
    fn from_iter<I: IntoIterator<Item = MediaReference>>(iter: I) -> Self {
        let catalog = Self::new();
        for media in iter {
            catalog.insert(media);
        }
        catalog
    }
}

#[async_trait]
impl MediaCatalog for InMemoryCatalog {
    async fn fetch_by_id(&self, id: &MediaId) -> Result<Option<MediaReference>, CatalogError> {
        Ok(self.media.read().get(id).cloned())
    }
}
