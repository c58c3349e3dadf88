//! Commands behind the `imgcrop` binary
//!
//! Each command returns its output as text so the binary only prints.

#![warn(missing_docs)]

use anyhow::{Context, Result};
use imgcrop_field::{global, FieldConfig, FieldMount};
use imgcrop_session::{InMemoryCatalog, MediaCatalog};
use imgcrop_value::{
    CodecOptions, InMemoryNode, MediaId, MediaReference, Multiplicity, NodeStore, PropertyValueCodec,
    StructuredValue, DEFAULT_ALIAS,
};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// Property the simulated session writes to
pub const SIMULATED_PROPERTY: &str = "image";

/// Decode a raw stored value
///
/// `raw` is parsed as JSON when possible; otherwise it is taken as the stored
/// string itself.
///
/// # Errors
/// Only if the decoded value cannot be rendered as JSON.
pub fn decode(raw: &str, multiplicity: Multiplicity) -> Result<String> {
    let stored = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    let value = PropertyValueCodec::new(multiplicity).decode(Some(&stored));
    serde_json::to_string_pretty(&value).context("rendering decoded value")
}

/// Encode a structured value given as JSON
///
/// # Errors
/// If `json` is not a structured value.
pub fn encode(json: &str, multiplicity: Multiplicity, options: CodecOptions) -> Result<String> {
    let value: StructuredValue = serde_json::from_str(json).context("parsing structured value")?;
    let shape = PropertyValueCodec::new(multiplicity)
        .with_options(options)
        .encode(Some(&value));
    serde_json::to_string(&shape.into_value()).context("rendering stored value")
}

/// Run a scripted edit session against an in-memory catalog and node
///
/// Select, crop, refresh and remove, printing every committed value and
/// the stored property after each persist.
///
/// # Errors
/// If the config file is invalid or the field cannot be mounted or persisted.
pub async fn simulate(config: Option<&Path>) -> Result<String> {
    let config = match config {
        Some(path) => FieldConfig::load(path)?,
        None => FieldConfig::default(),
    };

    let catalog = Arc::new(demo_catalog());
    let shared: Arc<dyn MediaCatalog> = catalog.clone();
    let mut node = InMemoryNode::new();
    let mut out = Vec::new();

    let mut mount = FieldMount::from_node(&node, SIMULATED_PROPERTY, shared)
        .with_options(config.field_options());
    if let Some(locale) = &config.session.locale {
        mount = mount.with_locale(locale.clone());
    }
    let mut field = global()
        .read()
        .mount(DEFAULT_ALIAS, mount)
        .context("mounting simulated field")?;
    let session = &field.controller;

    session.open_selection_overlay();
    session.confirm_selection(catalog.fetch_by_id(&MediaId::Number(1)).await?);
    out.push(format!("edit url: {}", session.open_external_editor().unwrap_or_default()));

    session.open_crop_editor();
    out.push(format!("confirm crop: {:?}", session.confirm_crop().await));

    catalog.insert(demo_media(1, "Harbour at dusk (recropped)"));
    out.push(format!("refresh: {:?}", session.refresh().await));

    field.persist(&mut node, SIMULATED_PROPERTY)?;
    out.push(format!("stored: {}", stored(&node)));

    field.controller.remove_image();
    field.persist(&mut node, SIMULATED_PROPERTY)?;
    out.push(format!("stored: {}", stored(&node)));

    let mut committed = 0;
    while let Ok(value) = field.changes.try_recv() {
        committed += 1;
        out.push(format!("commit {committed}: {}", serde_json::to_string(&value)?));
    }

    tracing::info!("simulation finished with {} commits", committed);
    Ok(out.join("\n"))
}

fn stored(node: &InMemoryNode) -> String {
    node.property_value(SIMULATED_PROPERTY)
        .map(|v| v.to_string())
        .unwrap_or_default()
}

fn demo_media(id: u64, title: &str) -> MediaReference {
    MediaReference::new(id, title)
        .with_url(format!("/uploads/media/{id}.jpg"))
        .with_admin_url(format!("/admin/uploads/media/{id}.jpg"))
        .with_thumbnail("wide", format!("/uploads/media/wide/{id}.jpg"))
}

fn demo_catalog() -> InMemoryCatalog {
    [demo_media(1, "Harbour at dusk"), demo_media(2, "Lighthouse")]
        .into_iter()
        .collect()
}
