//! Edit session controller
//!
//! Owns the field's [`StructuredValue`] for the lifetime of one mounted
//! field and turns user steps plus catalog fetches into committed values.
//!
//! # Ordering
//! - Every commit is sent to the owner as one message on [`ValueChanges`],
//!   in the order the steps were invoked. Loading states are never sent.
//! - Fetches carry a request number. A result is applied only if no newer
//!   request (or user selection / removal) was issued while it was in
//!   flight; otherwise it is dropped silently.
//! - Reload-resync commits `media: None` first and, after yielding to the
//!   scheduler, the fresh record with a new crop version. Observers that key
//!   cached pixels on media identity are thereby forced to refetch even when
//!   the id is unchanged.
//!
//! The state lock is never held across an `.await`.

use crate::catalog::MediaCatalog;
use crate::config::SessionConfig;
use crate::state::{Action, SessionState};
use crate::version::CropVersionClock;
use crate::view::SessionView;
use imgcrop_value::{MediaId, MediaReference, StructuredValue};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Receiver of committed values
pub type ValueChanges = mpsc::UnboundedReceiver<StructuredValue>;

/// Result of [`EditSessionController::load`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Record fetched and selected
    Loaded,
    /// Catalog has no such media; selection cleared
    NotFound,
    /// Fetch failed; selection unchanged
    FetchFailed,
    /// A newer request won; result dropped
    Superseded,
    /// No id requested; selection cleared
    Cleared,
    /// Media id did not change; nothing fetched
    Unchanged,
}

/// Result of the reload-resync procedure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResyncOutcome {
    /// Fresh record committed with a new crop version
    Resynced {
        /// Crop version token of the final commit
        version: String,
    },
    /// Fetch failed; value unchanged
    FetchFailed,
    /// Media deleted upstream; previous reference kept
    NotFound,
    /// A newer request or user step won; procedure abandoned
    Superseded,
    /// No media selected
    NothingSelected,
    /// Not possible from the current phase
    Ignored,
}

struct Inner {
    value: StructuredValue,
    state: SessionState,
    latest_request: u64,
}

enum ClearStep {
    Cleared,
    NothingToClear,
    Superseded,
}

/// Controller for one field-edit session
pub struct EditSessionController {
    inner: Mutex<Inner>,
    catalog: Arc<dyn MediaCatalog>,
    config: SessionConfig,
    clock: CropVersionClock,
    changes: mpsc::UnboundedSender<StructuredValue>,
}

impl fmt::Debug for EditSessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("EditSessionController")
            .field("value", &inner.value)
            .field("state", &inner.state)
            .field("latest_request", &inner.latest_request)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl EditSessionController {
    /// Create controller for a mounted field
    ///
    /// The initial value's media is used as the cached selection until
    /// [`initialize`](Self::initialize) refreshes it from the catalog.
    #[must_use]
    pub fn new(
        initial: StructuredValue,
        catalog: Arc<dyn MediaCatalog>,
        config: SessionConfig,
    ) -> (Self, ValueChanges) {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = SessionState::with_selected(initial.media.clone());

        let controller = Self {
            inner: Mutex::new(Inner {
                value: initial,
                state,
                latest_request: 0,
            }),
            catalog,
            config,
            clock: CropVersionClock::new(),
            changes: tx,
        };
        (controller, rx)
    }

    /// Committed value
    #[must_use]
    pub fn value(&self) -> StructuredValue {
        self.inner.lock().value.clone()
    }

    /// Session state snapshot
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.lock().state.clone()
    }

    /// Render snapshot
    #[must_use]
    pub fn view(&self) -> SessionView {
        SessionView::new(&self.inner.lock().state, &self.config)
    }

    /// Session configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Fetch the initial value's media from the catalog
    pub async fn initialize(&self) -> LoadOutcome {
        let id = self.inner.lock().value.media_id().cloned();
        match id {
            Some(id) => self.load(Some(&id)).await,
            None => LoadOutcome::Unchanged,
        }
    }

    /// Load `id` as the selected media; `None` clears the selection
    ///
    /// Does not commit a value: it refreshes what the field displays.
    pub async fn load(&self, id: Option<&MediaId>) -> LoadOutcome {
        let Some(seq) = self.begin_request(Action::BeginLoad) else {
            return LoadOutcome::Superseded;
        };

        let Some(id) = id else {
            return if self.complete_request(seq, Action::Loaded(None)) {
                LoadOutcome::Cleared
            } else {
                LoadOutcome::Superseded
            };
        };

        let (action, outcome) = match self.catalog.fetch_by_id(id).await {
            Ok(Some(media)) => (Action::Loaded(Some(media)), LoadOutcome::Loaded),
            Ok(None) => {
                tracing::info!("media {} not found", id);
                (Action::Loaded(None), LoadOutcome::NotFound)
            }
            Err(e) => {
                tracing::warn!("loading media {} failed: {}", id, e);
                (Action::LoadFailed, LoadOutcome::FetchFailed)
            }
        };

        if self.complete_request(seq, action) {
            outcome
        } else {
            tracing::debug!("dropping stale load of media {}", id);
            LoadOutcome::Superseded
        }
    }

    /// Adopt a value replaced by the owner, reloading if the media id changed
    ///
    /// No notification is sent for the adopted value.
    pub async fn sync_external_value(&self, value: StructuredValue) -> LoadOutcome {
        let (previous, next) = {
            let mut inner = self.inner.lock();
            let previous = inner.value.media_id().cloned();
            let next = value.media_id().cloned();
            inner.value = value;
            (previous, next)
        };

        if previous == next {
            return LoadOutcome::Unchanged;
        }
        self.load(next.as_ref()).await
    }

    /// Open the media picker
    pub fn open_selection_overlay(&self) {
        self.dispatch(Action::OpenSelectionOverlay);
    }

    /// Close the media picker
    pub fn close_selection_overlay(&self) {
        self.dispatch(Action::CloseSelectionOverlay);
    }

    /// Picker confirmed; `None` deselects exactly like [`remove_image`](Self::remove_image)
    pub fn confirm_selection(&self, media: Option<MediaReference>) {
        self.dispatch(Action::ConfirmSelection(media));
    }

    /// Remove the image; no-op if the value holds no media
    pub fn remove_image(&self) {
        self.dispatch(Action::RemoveImage);
    }

    /// Open the crop editor; no-op without selection
    pub fn open_crop_editor(&self) {
        self.dispatch(Action::OpenCropEditor);
    }

    /// Close the crop editor
    pub fn close_crop_editor(&self) {
        self.dispatch(Action::CloseCropEditor);
    }

    /// Crop confirmed in the editor
    ///
    /// Re-fetches the selected media first. Only if it still exists is the
    /// editor closed into a reload-resync; otherwise the editor is closed
    /// and the value left alone.
    pub async fn confirm_crop(&self) -> ResyncOutcome {
        let Some(id) = self.selected_id() else {
            self.dispatch(Action::CloseCropEditor);
            return ResyncOutcome::NothingSelected;
        };
        let Some(seq) = self.begin_request(Action::BeginLoad) else {
            return ResyncOutcome::Ignored;
        };

        let (action, outcome) = match self.catalog.fetch_by_id(&id).await {
            Ok(Some(media)) => {
                if self.complete_request(seq, Action::Loaded(Some(media))) {
                    return self.resync().await;
                }
                (None, ResyncOutcome::Superseded)
            }
            Ok(None) => {
                tracing::info!("media {} vanished before crop confirmation", id);
                (Some(Action::LoadFailed), ResyncOutcome::NotFound)
            }
            Err(e) => {
                tracing::warn!("crop confirmation check for media {} failed: {}", id, e);
                (Some(Action::LoadFailed), ResyncOutcome::FetchFailed)
            }
        };

        let current = action.is_some_and(|action| self.complete_request(seq, action));
        self.dispatch(Action::CloseCropEditor);
        if current {
            outcome
        } else {
            ResyncOutcome::Superseded
        }
    }

    /// Reload the selected media and recommit it with a new crop version
    pub async fn refresh(&self) -> ResyncOutcome {
        self.resync().await
    }

    /// Admin detail page of the selected media; `None` without selection
    #[must_use]
    pub fn open_external_editor(&self) -> Option<String> {
        self.selected_id().map(|id| self.config.edit_url(&id))
    }

    /// Reload-resync procedure
    async fn resync(&self) -> ResyncOutcome {
        let Some(id) = self.selected_id() else {
            return ResyncOutcome::NothingSelected;
        };
        let Some(seq) = self.begin_request(Action::BeginReload) else {
            return ResyncOutcome::Ignored;
        };

        let fetched = match self.catalog.fetch_by_id(&id).await {
            Ok(Some(media)) => media,
            Ok(None) => {
                tracing::info!("media {} not found on reload, keeping previous reference", id);
                return self.abort_reload(seq, ResyncOutcome::NotFound);
            }
            Err(e) => {
                tracing::warn!("reload of media {} failed: {}", id, e);
                return self.abort_reload(seq, ResyncOutcome::FetchFailed);
            }
        };

        match self.clear_for_reload(seq) {
            ClearStep::Superseded => return ResyncOutcome::Superseded,
            ClearStep::Cleared => tokio::task::yield_now().await,
            ClearStep::NothingToClear => {}
        }

        let version = self.clock.next_token();
        let finish = Action::FinishReload {
            media: fetched,
            version: version.clone(),
        };
        if self.complete_request(seq, finish) {
            tracing::info!("media {} resynced at crop version {}", id, version);
            ResyncOutcome::Resynced { version }
        } else {
            tracing::debug!("dropping stale reload of media {}", id);
            ResyncOutcome::Superseded
        }
    }

    fn abort_reload(&self, seq: u64, outcome: ResyncOutcome) -> ResyncOutcome {
        if self.complete_request(seq, Action::AbortReload) {
            outcome
        } else {
            ResyncOutcome::Superseded
        }
    }

    fn clear_for_reload(&self, seq: u64) -> ClearStep {
        let mut inner = self.inner.lock();
        if inner.latest_request != seq {
            return ClearStep::Superseded;
        }
        if inner.value.media.is_none() {
            return ClearStep::NothingToClear;
        }
        if self.apply_locked(&mut inner, Action::ClearForReload) {
            ClearStep::Cleared
        } else {
            ClearStep::Superseded
        }
    }

    fn selected_id(&self) -> Option<MediaId> {
        self.inner.lock().state.selected_id().cloned()
    }

    fn dispatch(&self, action: Action) -> bool {
        let mut inner = self.inner.lock();
        self.apply_locked(&mut inner, action)
    }

    /// Apply a step that starts a fetch and issue its request number
    fn begin_request(&self, action: Action) -> Option<u64> {
        let mut inner = self.inner.lock();
        if !self.apply_locked(&mut inner, action) {
            return None;
        }
        inner.latest_request += 1;
        Some(inner.latest_request)
    }

    /// Apply a fetch result if `seq` is still the latest request
    fn complete_request(&self, seq: u64, action: Action) -> bool {
        let mut inner = self.inner.lock();
        if inner.latest_request != seq {
            return false;
        }
        self.apply_locked(&mut inner, action)
    }

    fn apply_locked(&self, inner: &mut Inner, action: Action) -> bool {
        let Some(transition) = inner.state.apply(action, &inner.value) else {
            return false;
        };

        inner.state = transition.next;
        if transition.supersedes {
            inner.latest_request += 1;
        }
        if let Some(value) = transition.commit {
            inner.value = value.clone();
            tracing::debug!("committed image crop value, media {:?}", value.media_id());
            if self.changes.send(value).is_err() {
                tracing::debug!("value observer dropped");
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::state::EditPhase;
    use pretty_assertions::assert_eq;

    fn media(id: u64) -> MediaReference {
        MediaReference::new(id, format!("Media {id}")).with_url(format!("/media/{id}.jpg"))
    }

    fn controller(
        initial: StructuredValue,
        catalog: InMemoryCatalog,
    ) -> (EditSessionController, ValueChanges) {
        EditSessionController::new(initial, Arc::new(catalog), SessionConfig::new())
    }

    fn drain(rx: &mut ValueChanges) -> Vec<StructuredValue> {
        let mut out = Vec::new();
        while let Ok(value) = rx.try_recv() {
            out.push(value);
        }
        out
    }

    #[test]
    fn selection_overlay_toggles_do_not_commit() {
        let (c, mut rx) = controller(StructuredValue::default(), InMemoryCatalog::new());

        c.open_selection_overlay();
        assert!(c.state().selection_overlay_open());
        c.close_selection_overlay();
        assert_eq!(c.state().phase(), EditPhase::Empty);

        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn confirm_then_remove_emits_two_values() {
        let (c, mut rx) = controller(StructuredValue::default(), InMemoryCatalog::new());

        c.confirm_selection(Some(MediaReference::new("7", "A")));
        c.remove_image();

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].media, Some(MediaReference::new("7", "A")));
        assert_eq!(events[1].media, None);
    }

    #[test]
    fn remove_twice_emits_once() {
        let (c, mut rx) =
            controller(StructuredValue::with_media(media(1)), InMemoryCatalog::new());

        c.remove_image();
        c.remove_image();

        assert_eq!(drain(&mut rx).len(), 1);
        assert_eq!(c.value().media, None);
    }

    #[test]
    fn external_editor_requires_selection() {
        let (c, _rx) = controller(StructuredValue::default(), InMemoryCatalog::new());
        assert_eq!(c.open_external_editor(), None);

        c.confirm_selection(Some(media(12)));
        assert_eq!(
            c.open_external_editor().as_deref(),
            Some("/admin/#/media/en/12/details")
        );
    }

    #[tokio::test]
    async fn refresh_without_media_in_value_commits_once() {
        let catalog: InMemoryCatalog = [media(5)].into_iter().collect();
        let (c, mut rx) = controller(StructuredValue::default(), catalog);

        assert_eq!(c.load(Some(&MediaId::Number(5))).await, LoadOutcome::Loaded);
        let outcome = c.refresh().await;

        let ResyncOutcome::Resynced { version } = outcome else {
            panic!("expected resync, got {outcome:?}");
        };
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].media, Some(media(5)));
        assert_eq!(events[0].last_crop_version, Some(version));
    }

    #[tokio::test]
    async fn initialize_refreshes_cached_selection() {
        let fresh = media(3).with_thumbnail("wide", "/media/3-wide.jpg");
        let catalog: InMemoryCatalog = [fresh.clone()].into_iter().collect();
        let (c, mut rx) = controller(StructuredValue::with_media(media(3)), catalog);

        assert_eq!(c.state().selected(), Some(&media(3)));
        assert_eq!(c.initialize().await, LoadOutcome::Loaded);
        assert_eq!(c.state().selected(), Some(&fresh));
        assert!(!c.state().loading());
        assert!(drain(&mut rx).is_empty());
    }
}
