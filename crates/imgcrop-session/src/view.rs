//! Read model for presentation
//!
//! Rendering code gets a snapshot; it never touches [`SessionState`].

use crate::config::SessionConfig;
use crate::state::{EditPhase, SessionState};
use imgcrop_value::MediaId;
use serde::Serialize;

/// Snapshot of what the field should render
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    /// Session phase
    pub phase: EditPhase,
    /// Media is selected
    pub has_media: bool,
    /// Selected media title
    pub title: Option<String>,
    /// Preview image; hidden while a fetch is in flight
    pub preview_src: Option<String>,
    /// Image handed to the crop editor
    pub crop_src: Option<String>,
    /// Ids the picker should not offer again
    pub excluded_ids: Vec<MediaId>,
    /// A fetch is in flight
    pub loading: bool,
    /// Media picker is open
    pub selection_overlay_open: bool,
    /// Crop editor is open
    pub crop_overlay_open: bool,
}

impl SessionView {
    /// Build view from state and configuration
    #[must_use]
    pub fn new(state: &SessionState, config: &SessionConfig) -> Self {
        let media = state.selected();

        let preview_src = media.filter(|_| !state.loading()).map(|m| {
            config
                .preview_crop_key
                .as_deref()
                .and_then(|key| m.thumbnail(key))
                .unwrap_or(&m.url)
                .to_string()
        });

        let crop_src = media.map(|m| {
            m.admin_url
                .as_deref()
                .filter(|url| !url.is_empty())
                .unwrap_or(&m.url)
                .to_string()
        });

        Self {
            phase: state.phase(),
            has_media: media.is_some(),
            title: media.map(|m| m.title.clone()),
            preview_src,
            crop_src,
            excluded_ids: media.map(|m| vec![m.id.clone()]).unwrap_or_default(),
            loading: state.loading(),
            selection_overlay_open: state.selection_overlay_open(),
            crop_overlay_open: state.crop_overlay_open(),
        }
    }
}
