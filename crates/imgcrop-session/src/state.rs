//! Edit session state machine
//!
//! One field-edit UI instance moves between five phases:
//!
//! ```text
//! Empty --open selection--> SelectionOverlayOpen --confirm(media)--> Selected
//! SelectionOverlayOpen --confirm(none)--> Empty
//! Selected --open crop--> CropOverlayOpen --confirm crop--> Reloading --resynced--> Selected
//! Selected --remove--> Empty
//! Reloading --fetch failed--> Selected
//! ```
//!
//! Every synchronous step goes through [`SessionState::apply`], which returns
//! the next state and, when the step changes the field value, the value to
//! commit. Steps that make no sense from the current state are no-ops.

use crate::error::TransitionError;
use imgcrop_value::{MediaId, MediaReference, StructuredValue};
use serde::Serialize;

/// Session phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditPhase {
    /// No media selected
    #[default]
    Empty,
    /// Media selected, no overlay open
    Selected,
    /// Media picker open
    SelectionOverlayOpen,
    /// Crop editor open
    CropOverlayOpen,
    /// Reload-resync in flight
    Reloading,
}

/// Phases reachable from `from` (self transitions are always allowed)
#[must_use]
pub fn allowed_transitions(from: EditPhase) -> Vec<EditPhase> {
    use EditPhase::*;
    match from {
        Empty => vec![SelectionOverlayOpen, Selected],
        Selected => vec![SelectionOverlayOpen, CropOverlayOpen, Reloading, Empty],
        SelectionOverlayOpen => vec![Selected, Empty],
        CropOverlayOpen => vec![Reloading, Selected, Empty],
        Reloading => vec![Selected, Empty],
    }
}

/// Validates a phase transition.
///
/// # Errors
/// [`TransitionError::IllegalTransition`] if `to` is not reachable from `from`.
pub fn validate_transition(from: EditPhase, to: EditPhase) -> Result<(), TransitionError> {
    if from == to || allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(TransitionError::IllegalTransition { from, to })
    }
}

/// A synchronous session step
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Open the media picker
    OpenSelectionOverlay,
    /// Close the media picker without choosing
    CloseSelectionOverlay,
    /// Picker confirmed; `None` deselects
    ConfirmSelection(Option<MediaReference>),
    /// Remove the selected image
    RemoveImage,
    /// Open the crop editor
    OpenCropEditor,
    /// Close the crop editor without confirming
    CloseCropEditor,
    /// Reload-resync started
    BeginReload,
    /// First half of the two-phase commit: drop the media from the value
    ClearForReload,
    /// Reload-resync fetched the record
    FinishReload {
        /// Fresh record
        media: MediaReference,
        /// New crop version token
        version: String,
    },
    /// Reload-resync gave up; previous value stands
    AbortReload,
    /// A fetch of the selected media started
    BeginLoad,
    /// A fetch finished; `None` means not found
    Loaded(Option<MediaReference>),
    /// A fetch failed
    LoadFailed,
}

/// Result of applying an [`Action`]
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// State after the step
    pub next: SessionState,
    /// Value to commit and announce, if the step changes it
    pub commit: Option<StructuredValue>,
    /// The step is a user decision that outdates any in-flight fetch
    pub supersedes: bool,
}

/// Transient UI state of one edit session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    phase: EditPhase,
    selected: Option<MediaReference>,
    loading: bool,
}

impl SessionState {
    /// Create empty state
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State seeded with a cached selection
    #[must_use]
    pub fn with_selected(selected: Option<MediaReference>) -> Self {
        Self {
            phase: resting_phase(selected.as_ref()),
            selected,
            loading: false,
        }
    }

    /// Current phase
    #[inline]
    #[must_use]
    pub fn phase(&self) -> EditPhase {
        self.phase
    }

    /// Currently selected media
    #[inline]
    #[must_use]
    pub fn selected(&self) -> Option<&MediaReference> {
        self.selected.as_ref()
    }

    /// Id of the currently selected media
    #[inline]
    #[must_use]
    pub fn selected_id(&self) -> Option<&MediaId> {
        self.selected.as_ref().map(|m| &m.id)
    }

    /// A fetch is in flight
    #[inline]
    #[must_use]
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Media picker is open
    #[inline]
    #[must_use]
    pub fn selection_overlay_open(&self) -> bool {
        self.phase == EditPhase::SelectionOverlayOpen
    }

    /// Crop editor is open
    #[inline]
    #[must_use]
    pub fn crop_overlay_open(&self) -> bool {
        self.phase == EditPhase::CropOverlayOpen
    }

    /// Apply a step against the committed `value`
    ///
    /// Returns `None` when the step is a no-op from this state.
    #[must_use]
    pub fn apply(&self, action: Action, value: &StructuredValue) -> Option<Transition> {
        let mut next = self.clone();
        let mut commit = None;
        let mut supersedes = false;

        match action {
            Action::OpenSelectionOverlay => next.phase = EditPhase::SelectionOverlayOpen,
            Action::CloseSelectionOverlay => {
                if !self.selection_overlay_open() {
                    return self.ignore("close selection overlay");
                }
                next.phase = resting_phase(self.selected.as_ref());
            }
            Action::ConfirmSelection(Some(media)) => {
                next.selected = Some(media.clone());
                next.phase = EditPhase::Selected;
                next.loading = false;
                commit = Some(value.replace_media(Some(media)));
                supersedes = true;
            }
            Action::ConfirmSelection(None) if value.media.is_none() => {
                if !self.selection_overlay_open() {
                    return self.ignore("deselect without media");
                }
                next.phase = resting_phase(self.selected.as_ref());
            }
            Action::ConfirmSelection(None) | Action::RemoveImage => {
                if value.media.is_none() {
                    return self.ignore("remove image without media");
                }
                next.selected = None;
                next.phase = EditPhase::Empty;
                next.loading = false;
                commit = Some(value.replace_media(None));
                supersedes = true;
            }
            Action::OpenCropEditor => {
                if self.selected.is_none() {
                    return self.ignore("open crop editor without media");
                }
                next.phase = EditPhase::CropOverlayOpen;
            }
            Action::CloseCropEditor => {
                if !self.crop_overlay_open() {
                    return self.ignore("close crop editor");
                }
                next.phase = resting_phase(self.selected.as_ref());
            }
            Action::BeginReload => {
                if self.selected.is_none() {
                    return self.ignore("reload without media");
                }
                next.phase = EditPhase::Reloading;
                next.loading = true;
            }
            Action::ClearForReload => {
                if self.phase != EditPhase::Reloading {
                    return self.ignore("clear outside reload");
                }
                commit = Some(value.replace_media(None));
            }
            Action::FinishReload { media, version } => {
                if self.phase != EditPhase::Reloading {
                    return self.ignore("finish outside reload");
                }
                next.selected = Some(media.clone());
                next.phase = EditPhase::Selected;
                next.loading = false;
                commit = Some(StructuredValue {
                    media: Some(media),
                    last_crop_version: Some(version),
                    ..value.clone()
                });
            }
            Action::AbortReload => {
                if self.phase != EditPhase::Reloading {
                    return self.ignore("abort outside reload");
                }
                next.phase = resting_phase(self.selected.as_ref());
                next.loading = false;
            }
            Action::BeginLoad => {
                // A newer fetch takes over from a pending reload
                if self.phase == EditPhase::Reloading {
                    next.phase = resting_phase(self.selected.as_ref());
                }
                next.loading = true;
            }
            Action::Loaded(media) => {
                next.phase = match (self.phase, &media) {
                    (EditPhase::SelectionOverlayOpen, _) => EditPhase::SelectionOverlayOpen,
                    (phase @ (EditPhase::CropOverlayOpen | EditPhase::Reloading), Some(_)) => phase,
                    _ => resting_phase(media.as_ref()),
                };
                next.selected = media;
                next.loading = false;
            }
            Action::LoadFailed => next.loading = false,
        }

        if let Err(e) = validate_transition(self.phase, next.phase) {
            tracing::debug!("dropping session step: {}", e);
            return None;
        }

        Some(Transition {
            next,
            commit,
            supersedes,
        })
    }

    fn ignore(&self, step: &str) -> Option<Transition> {
        tracing::debug!("ignoring {} in phase {:?}", step, self.phase);
        None
    }
}

fn resting_phase(selected: Option<&MediaReference>) -> EditPhase {
    if selected.is_some() {
        EditPhase::Selected
    } else {
        EditPhase::Empty
    }
}
