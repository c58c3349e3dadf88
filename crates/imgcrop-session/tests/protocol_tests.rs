use async_trait::async_trait;
use imgcrop_session::{
    CatalogError, EditPhase, EditSessionController, LoadOutcome, MediaCatalog, ResyncOutcome,
    SessionConfig,
};
use imgcrop_test_utils::{cover, drain, media, session, value_with, ScriptedCatalog};
use imgcrop_value::{MediaId, MediaReference, StructuredValue};
use mockall::mock;
use pretty_assertions::assert_eq;
use std::sync::Arc;

mock! {
    pub Catalog {}

    #[async_trait]
    impl MediaCatalog for Catalog {
        async fn fetch_by_id(&self, id: &MediaId) -> Result<Option<MediaReference>, CatalogError>;
    }
}

async fn wait_for_calls(catalog: &ScriptedCatalog, n: usize) {
    while catalog.calls() < n {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_confirm_crop_clears_then_sets() {
    let fresh = media(1).with_url("/uploads/media/1.jpg?cropped");
    let catalog = Arc::new(ScriptedCatalog::with_media([fresh.clone()]));
    let (c, mut changes) = session(value_with(media(1)), &catalog);

    c.open_crop_editor();
    assert_eq!(c.state().phase(), EditPhase::CropOverlayOpen);

    let outcome = c.confirm_crop().await;
    let ResyncOutcome::Resynced { version } = outcome else {
        panic!("expected resync, got {outcome:?}");
    };

    let events = drain(&mut changes);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].media, None);
    assert_eq!(events[1].media, Some(fresh));
    assert_eq!(events[1].last_crop_version.as_deref(), Some(version.as_str()));

    assert_eq!(c.state().phase(), EditPhase::Selected);
    assert!(!c.state().loading());
    // Pre-check plus resync
    assert_eq!(catalog.calls(), 2);
}

#[tokio::test]
async fn test_two_resync_cycles_issue_distinct_tokens() {
    let catalog = Arc::new(ScriptedCatalog::with_media([media(1)]));
    let (c, mut changes) = session(value_with(media(1)), &catalog);

    c.open_crop_editor();
    let first = c.confirm_crop().await;
    let second = c.refresh().await;

    let (ResyncOutcome::Resynced { version: a }, ResyncOutcome::Resynced { version: b }) =
        (first, second)
    else {
        panic!("both cycles should resync");
    };
    assert_ne!(a, b);

    let events = drain(&mut changes);
    let present: Vec<_> = events.iter().map(|v| v.media.is_some()).collect();
    assert_eq!(present, vec![false, true, false, true]);

    // the clear commit carries the previous token forward
    let tokens: Vec<_> = events
        .into_iter()
        .filter(|v| v.media.is_some())
        .filter_map(|v| v.last_crop_version)
        .collect();
    assert_eq!(tokens, vec![a, b]);
}

#[tokio::test]
async fn test_clear_is_observable_before_set() {
    let catalog = Arc::new(ScriptedCatalog::with_media([media(1)]));
    let (c, mut changes) = session(value_with(media(1)), &catalog);
    let c = Arc::new(c);

    let observer = {
        let c = Arc::clone(&c);
        tokio::spawn(async move {
            let first = changes.recv().await.unwrap();
            (first.media.is_none(), c.value().media.is_none())
        })
    };

    assert!(matches!(c.refresh().await, ResyncOutcome::Resynced { .. }));

    let (first_cleared, still_cleared) = observer.await.unwrap();
    assert!(first_cleared);
    assert!(still_cleared);
    assert!(c.value().media.is_some());
}

#[tokio::test]
async fn test_clear_keeps_preview_crop_key() {
    let catalog = Arc::new(ScriptedCatalog::with_media([media(1)]));
    let initial = StructuredValue {
        preview_crop_key: Some("wide".to_string()),
        ..value_with(media(1))
    };
    let (c, mut changes) = session(initial, &catalog);

    assert!(matches!(c.refresh().await, ResyncOutcome::Resynced { .. }));

    for event in drain(&mut changes) {
        assert_eq!(event.preview_crop_key.as_deref(), Some("wide"));
    }
}

#[tokio::test]
async fn test_refresh_fetch_failure_preserves_value() {
    let mut catalog = MockCatalog::new();
    catalog
        .expect_fetch_by_id()
        .withf(|id| *id == MediaId::Number(1))
        .times(1)
        .returning(|_| Err(CatalogError::Unavailable));

    let initial = StructuredValue {
        last_crop_version: Some("17".to_string()),
        ..value_with(media(1))
    };
    let (c, mut changes) =
        EditSessionController::new(initial.clone(), Arc::new(catalog), SessionConfig::new());

    assert_eq!(c.refresh().await, ResyncOutcome::FetchFailed);
    assert_eq!(c.value(), initial);
    assert!(drain(&mut changes).is_empty());
    assert_eq!(c.state().phase(), EditPhase::Selected);
    assert!(!c.state().loading());
}

#[tokio::test]
async fn test_refresh_not_found_keeps_stale_reference() {
    let catalog = Arc::new(ScriptedCatalog::with_media([media(3)]));
    let (c, mut changes) = session(value_with(media(3)), &catalog);
    assert_eq!(c.initialize().await, LoadOutcome::Loaded);

    catalog.delete(&MediaId::Number(3));

    assert_eq!(c.refresh().await, ResyncOutcome::NotFound);
    assert_eq!(c.value().media, Some(media(3)));
    assert_eq!(c.state().selected(), Some(&media(3)));
    assert!(drain(&mut changes).is_empty());
}

#[tokio::test]
async fn test_confirm_crop_precheck_failure_closes_editor() {
    let catalog = Arc::new(ScriptedCatalog::with_media([media(1)]));
    let (c, mut changes) = session(value_with(media(1)), &catalog);

    catalog.fail_next(CatalogError::Timeout { after_ms: 500 });
    c.open_crop_editor();

    assert_eq!(c.confirm_crop().await, ResyncOutcome::FetchFailed);
    assert!(!c.state().crop_overlay_open());
    assert_eq!(c.state().phase(), EditPhase::Selected);
    assert_eq!(c.value().media, Some(media(1)));
    assert!(drain(&mut changes).is_empty());
    // No resync after a failed pre-check
    assert_eq!(catalog.calls(), 1);
}

#[tokio::test]
async fn test_confirm_crop_precheck_not_found_closes_editor() {
    let catalog = Arc::new(ScriptedCatalog::new());
    let (c, mut changes) = session(value_with(media(9)), &catalog);

    c.open_crop_editor();
    assert_eq!(c.confirm_crop().await, ResyncOutcome::NotFound);
    assert!(!c.state().crop_overlay_open());
    assert_eq!(c.value().media, Some(media(9)));
    assert!(drain(&mut changes).is_empty());
}

#[tokio::test]
async fn test_refresh_without_selection() {
    let catalog = Arc::new(ScriptedCatalog::new());
    let (c, _changes) = session(StructuredValue::default(), &catalog);

    assert_eq!(c.refresh().await, ResyncOutcome::NothingSelected);
    assert_eq!(c.confirm_crop().await, ResyncOutcome::NothingSelected);
    assert_eq!(catalog.calls(), 0);
}

#[tokio::test]
async fn test_refresh_ignored_while_picker_open() {
    let catalog = Arc::new(ScriptedCatalog::with_media([media(1)]));
    let (c, mut changes) = session(value_with(media(1)), &catalog);

    c.open_selection_overlay();
    assert_eq!(c.refresh().await, ResyncOutcome::Ignored);
    assert!(c.state().selection_overlay_open());
    assert!(drain(&mut changes).is_empty());
}

#[test]
fn test_select_then_remove_emits_two_events() {
    let catalog = Arc::new(ScriptedCatalog::new());
    let (c, mut changes) = session(StructuredValue::default(), &catalog);

    c.open_selection_overlay();
    c.confirm_selection(Some(MediaReference::new("7", "A")));
    c.remove_image();

    let events = drain(&mut changes);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].media, Some(MediaReference::new("7", "A")));
    assert_eq!(events[1].media, None);
}

#[test]
fn test_remove_image_is_idempotent() {
    let catalog = Arc::new(ScriptedCatalog::new());
    let (c, mut changes) = session(value_with(cover()), &catalog);

    c.remove_image();
    c.remove_image();

    assert_eq!(drain(&mut changes).len(), 1);
    assert_eq!(c.value().media, None);
    assert_eq!(c.state().phase(), EditPhase::Empty);
}

#[test]
fn test_deselect_via_picker_matches_remove() {
    let catalog = Arc::new(ScriptedCatalog::new());
    let (c, mut changes) = session(value_with(cover()), &catalog);

    c.open_selection_overlay();
    c.confirm_selection(None);

    let events = drain(&mut changes);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].media, None);
    assert!(!c.state().selection_overlay_open());
}

#[tokio::test]
async fn test_latest_load_wins() {
    let catalog = Arc::new(ScriptedCatalog::with_media([media(1), media(2)]));
    let (c, _changes) = session(StructuredValue::default(), &catalog);
    let c = Arc::new(c);

    let release = catalog.hold(1u64);
    let slow = tokio::spawn({
        let c = Arc::clone(&c);
        async move { c.load(Some(&MediaId::Number(1))).await }
    });
    wait_for_calls(&catalog, 1).await;

    assert_eq!(c.load(Some(&MediaId::Number(2))).await, LoadOutcome::Loaded);
    release.send(()).unwrap();

    assert_eq!(slow.await.unwrap(), LoadOutcome::Superseded);
    assert_eq!(c.state().selected_id(), Some(&MediaId::Number(2)));
    assert!(!c.state().loading());
}

#[tokio::test]
async fn test_removal_during_reload_wins() {
    let catalog = Arc::new(ScriptedCatalog::with_media([media(1)]));
    let (c, mut changes) = session(value_with(media(1)), &catalog);
    let c = Arc::new(c);

    let release = catalog.hold(1u64);
    let reload = tokio::spawn({
        let c = Arc::clone(&c);
        async move { c.refresh().await }
    });
    wait_for_calls(&catalog, 1).await;

    c.remove_image();
    release.send(()).unwrap();

    assert_eq!(reload.await.unwrap(), ResyncOutcome::Superseded);
    assert_eq!(c.value().media, None);
    assert_eq!(c.state().phase(), EditPhase::Empty);
    assert!(!c.state().loading());

    let events = drain(&mut changes);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].media, None);
}

#[tokio::test]
async fn test_sync_external_value_reloads_on_id_change() {
    let catalog = Arc::new(ScriptedCatalog::with_media([media(1), media(2)]));
    let (c, mut changes) = session(value_with(media(1)), &catalog);

    assert_eq!(
        c.sync_external_value(value_with(media(1))).await,
        LoadOutcome::Unchanged
    );
    assert_eq!(catalog.calls(), 0);

    assert_eq!(
        c.sync_external_value(value_with(MediaReference::new(2, "stale"))).await,
        LoadOutcome::Loaded
    );
    assert_eq!(c.state().selected(), Some(&media(2)));

    assert_eq!(
        c.sync_external_value(StructuredValue::default()).await,
        LoadOutcome::Cleared
    );
    assert_eq!(c.state().phase(), EditPhase::Empty);
    assert!(drain(&mut changes).is_empty());
}

#[tokio::test]
async fn test_initialize_not_found_clears_selection() {
    let catalog = Arc::new(ScriptedCatalog::new());
    let (c, _changes) = session(value_with(cover()), &catalog);

    assert_eq!(c.initialize().await, LoadOutcome::NotFound);
    assert_eq!(c.state().selected(), None);
    // The stored value is left for the owner to decide on
    assert_eq!(c.value().media, Some(cover()));
}

#[tokio::test]
async fn test_initialize_failure_keeps_cached_selection() {
    let catalog = Arc::new(ScriptedCatalog::with_media([cover()]));
    catalog.fail_next(CatalogError::transport("connection reset"));
    let (c, _changes) = session(value_with(cover()), &catalog);

    assert_eq!(c.initialize().await, LoadOutcome::FetchFailed);
    assert_eq!(c.state().selected(), Some(&cover()));
    assert!(!c.state().loading());
}

#[test]
fn test_external_editor_url() {
    let catalog: Arc<dyn MediaCatalog> = Arc::new(ScriptedCatalog::new());
    let config = SessionConfig::new().with_locale("fr");
    let (c, _changes) = EditSessionController::new(value_with(cover()), catalog, config);

    assert_eq!(
        c.open_external_editor().as_deref(),
        Some("/admin/#/media/fr/42/details")
    );

    c.remove_image();
    assert_eq!(c.open_external_editor(), None);
}

#[test]
fn test_view_of_cached_selection() {
    let catalog = Arc::new(ScriptedCatalog::new());
    let (c, _changes) = session(value_with(media(5)), &catalog);

    let view = c.view();
    assert_eq!(view.preview_src.as_deref(), Some("/uploads/media/5.jpg"));
    assert_eq!(view.crop_src.as_deref(), Some("/admin/uploads/media/5.jpg"));
    assert_eq!(view.excluded_ids, vec![MediaId::Number(5)]);
}
