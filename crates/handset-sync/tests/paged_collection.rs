use std::sync::Arc;
use std::time::Duration;

use handset_api_models::{Category, Phone};
use handset_sync::{
    Method, PageRequest, PagedCollection, ResourceEndpoints, SyncConfig, SyncError, Transport,
    ViewKind, Warning,
};
use handset_test_support::fixtures::{
    bare_list_envelope, category, empty_envelope, error_envelope, page_envelope, phone,
};
use handset_test_support::mocks::{Reply, ScriptedTransport};
use serde_json::json;

const ACTIVE: &str = "/categories/all-page";
const ALTERNATE: &str = "/categories/list";
const DELETED: &str = "/categories/deleted";

fn collection(transport: &Arc<ScriptedTransport>, view: ViewKind) -> PagedCollection<Category> {
    let transport: Arc<dyn Transport> = transport.clone();
    PagedCollection::new(
        transport,
        Arc::new(ResourceEndpoints::categories()),
        view,
        &SyncConfig::default(),
    )
    .expect("default config is valid")
}

#[tokio::test]
async fn empty_pages_fall_back_once_and_terminate() -> anyhow::Result<()> {
    let transport = ScriptedTransport::new();
    transport.always(Method::Get, ACTIVE, Reply::ok(empty_envelope()));
    let active = collection(&transport, ViewKind::Active);

    let report = active.load(PageRequest::new(4, 10)?).await?;

    assert_eq!(transport.count(ACTIVE), 2);
    assert!(report.fell_back);
    assert_eq!(report.page.index(), 0);
    let state = active.snapshot();
    assert_eq!(state.current_page, PageRequest::new(0, 10)?);
    assert!(state.result.items.is_empty());
    assert_eq!(state.result.total_count, 0);
    assert!(!state.is_loading);
    Ok(())
}

#[tokio::test]
async fn fallback_commits_first_page_with_same_size() -> anyhow::Result<()> {
    let transport = ScriptedTransport::new();
    transport.push_get(ACTIVE, Reply::ok(empty_envelope()));
    transport.push_get(
        ACTIVE,
        Reply::ok(page_envelope(&[category(1, "Flagship"), category(2, "Budget")], 2)),
    );
    let active = collection(&transport, ViewKind::Active);

    let report = active.load(PageRequest::new(2, 5)?).await?;

    assert_eq!(report.requested, PageRequest::new(2, 5)?);
    assert_eq!(report.page, PageRequest::new(0, 5)?);
    assert_eq!(active.current_page(), PageRequest::new(0, 5)?);
    assert_eq!(active.ids(), vec![1, 2]);
    let sizes: Vec<String> = transport
        .calls()
        .iter()
        .filter_map(|call| call.query.iter().find(|(name, _)| name == "size"))
        .map(|(_, value)| value.clone())
        .collect();
    assert_eq!(sizes, vec!["5".to_string(), "5".to_string()]);
    Ok(())
}

#[tokio::test]
async fn not_found_status_triggers_fallback() -> anyhow::Result<()> {
    let transport = ScriptedTransport::new();
    transport.push_get(
        DELETED,
        Reply::status(404, error_envelope(1004, "page not found")),
    );
    transport.push_get(DELETED, Reply::ok(page_envelope(&[category(9, "Old")], 1)));
    let deleted = collection(&transport, ViewKind::Deleted);

    let report = deleted.load(PageRequest::new(1, 10)?).await?;

    assert!(report.fell_back);
    assert_eq!(deleted.current_page().index(), 0);
    assert_eq!(deleted.ids(), vec![9]);
    assert_eq!(transport.count(DELETED), 2);
    Ok(())
}

#[tokio::test]
async fn empty_first_page_commits_without_retry() -> anyhow::Result<()> {
    let transport = ScriptedTransport::new();
    transport.always(Method::Get, DELETED, Reply::ok(empty_envelope()));
    let deleted = collection(&transport, ViewKind::Deleted);

    let report = deleted.load(PageRequest::new(0, 10)?).await?;

    assert!(!report.fell_back);
    assert_eq!(report.rows, 0);
    assert_eq!(transport.count(DELETED), 1);
    Ok(())
}

#[tokio::test]
async fn failures_keep_last_good_result() -> anyhow::Result<()> {
    let transport = ScriptedTransport::new();
    transport.push_get(DELETED, Reply::ok(page_envelope(&[category(3, "Kept")], 1)));
    transport.push_get(
        DELETED,
        Reply::status(500, error_envelope(9999, "database unavailable")),
    );
    let deleted = collection(&transport, ViewKind::Deleted);
    deleted.load(PageRequest::new(0, 10)?).await?;

    let err = deleted
        .load(PageRequest::new(1, 10)?)
        .await
        .expect_err("server error surfaces");

    assert_eq!(
        err,
        SyncError::Backend {
            code: Some(9999),
            status: 500,
            message: "database unavailable".into()
        }
    );
    let state = deleted.snapshot();
    assert_eq!(state.current_page.index(), 0);
    assert_eq!(deleted.ids(), vec![3]);
    assert!(!state.is_loading);
    Ok(())
}

#[tokio::test]
async fn failed_retry_after_fallback_resets_view_to_first_page() -> anyhow::Result<()> {
    let transport = ScriptedTransport::new();
    transport.push_get(DELETED, Reply::ok(page_envelope(&[category(21, "Stale")], 21)));
    transport.push_get(DELETED, Reply::ok(empty_envelope()));
    transport.push_get(
        DELETED,
        Reply::status(500, error_envelope(9999, "database unavailable")),
    );
    let deleted = collection(&transport, ViewKind::Deleted);
    deleted.load(PageRequest::new(2, 10)?).await?;
    assert_eq!(deleted.ids(), vec![21]);

    let err = deleted
        .reload()
        .await
        .expect_err("retry failure surfaces");

    assert!(matches!(err, SyncError::Backend { code: Some(9999), .. }));
    assert_eq!(transport.count(DELETED), 3);
    let state = deleted.snapshot();
    assert_eq!(state.current_page, PageRequest::new(0, 10)?);
    assert!(state.result.items.is_empty());
    assert_eq!(state.result.total_count, 0);
    assert!(!state.is_loading);
    Ok(())
}

#[tokio::test]
async fn not_found_again_after_fallback_commits_empty_first_page() -> anyhow::Result<()> {
    let transport = ScriptedTransport::new();
    transport.always(
        Method::Get,
        DELETED,
        Reply::status(404, error_envelope(1004, "page not found")),
    );
    let deleted = collection(&transport, ViewKind::Deleted);

    let report = deleted.load(PageRequest::new(3, 10)?).await?;

    assert!(report.fell_back);
    assert_eq!(report.page, PageRequest::new(0, 10)?);
    assert_eq!(report.rows, 0);
    assert_eq!(report.total_count, 0);
    assert_eq!(transport.count(DELETED), 2);
    assert_eq!(deleted.current_page().index(), 0);
    Ok(())
}

#[tokio::test]
async fn transport_failure_on_deleted_view_is_surfaced() -> anyhow::Result<()> {
    let transport = ScriptedTransport::new();
    transport.always(Method::Get, DELETED, Reply::Refused);
    let deleted = collection(&transport, ViewKind::Deleted);

    let err = deleted
        .load(PageRequest::new(0, 10)?)
        .await
        .expect_err("refused connection surfaces");

    assert!(matches!(err, SyncError::Transport(_)));
    assert_eq!(transport.count(DELETED), 1);
    Ok(())
}

#[tokio::test]
async fn active_view_uses_alternate_path_after_primary_failure() -> anyhow::Result<()> {
    let transport = ScriptedTransport::new();
    transport.push_get(ACTIVE, Reply::Refused);
    transport.push_get(ALTERNATE, Reply::ok(page_envelope(&[category(5, "Rugged")], 1)));
    let active = collection(&transport, ViewKind::Active);

    let report = active.load(PageRequest::new(0, 10)?).await?;

    assert_eq!(transport.paths(), vec![ACTIVE.to_string(), ALTERNATE.to_string()]);
    assert_eq!(active.ids(), vec![5]);
    assert!(matches!(
        report.warnings.as_slice(),
        [Warning::AlternateEndpoint { path, .. }] if path == ALTERNATE
    ));
    Ok(())
}

#[tokio::test]
async fn alternate_failure_surfaces_primary_error() -> anyhow::Result<()> {
    let transport = ScriptedTransport::new();
    transport.push_get(
        ACTIVE,
        Reply::status(500, error_envelope(9999, "primary down")),
    );
    transport.push_get(ALTERNATE, Reply::Refused);
    let active = collection(&transport, ViewKind::Active);

    let err = active
        .load(PageRequest::new(0, 10)?)
        .await
        .expect_err("both paths failed");

    assert!(matches!(err, SyncError::Backend { ref message, .. } if message == "primary down"));
    Ok(())
}

#[tokio::test]
async fn empty_result_never_consults_alternate_path() -> anyhow::Result<()> {
    let transport = ScriptedTransport::new();
    transport.always(Method::Get, ACTIVE, Reply::ok(empty_envelope()));
    let active = collection(&transport, ViewKind::Active);

    active.load(PageRequest::new(6, 10)?).await?;

    assert_eq!(transport.count(ALTERNATE), 0);
    assert_eq!(transport.count(ACTIVE), 2);
    Ok(())
}

#[tokio::test]
async fn unexpected_shape_degrades_to_empty_page_with_warning() -> anyhow::Result<()> {
    let transport = ScriptedTransport::new();
    transport.push_get(ACTIVE, Reply::ok(json!({"code": 1000, "result": {"rows": 3}})));
    let active = collection(&transport, ViewKind::Active);

    let report = active.load(PageRequest::new(1, 10)?).await?;

    assert_eq!(report.rows, 0);
    assert!(report.fell_back);
    assert_eq!(active.current_page(), PageRequest::new(0, 10)?);
    assert_eq!(transport.count(ACTIVE), 1);
    assert!(matches!(
        report.warnings.as_slice(),
        [Warning::StructuralMismatch { view, .. }] if view == "categories/active"
    ));
    Ok(())
}

#[tokio::test]
async fn bare_arrays_and_oversized_pages_are_normalised() -> anyhow::Result<()> {
    let transport = ScriptedTransport::new();
    let rows: Vec<Category> = (1..=4).map(|id| category(id, "Bulk")).collect();
    transport.push_get(ACTIVE, Reply::ok(bare_list_envelope(&rows)));
    let active = collection(&transport, ViewKind::Active);

    let report = active.load(PageRequest::new(0, 3)?).await?;

    assert_eq!(report.rows, 3);
    assert_eq!(report.total_count, 4);
    assert_eq!(active.ids(), vec![1, 2, 3]);
    assert!(report.warnings.contains(&Warning::OversizedPage {
        expected: 3,
        received: 4
    }));
    Ok(())
}

#[tokio::test]
async fn concurrent_load_on_same_view_is_rejected() -> anyhow::Result<()> {
    let transport = ScriptedTransport::new();
    let gate = transport.gate(Method::Get, DELETED);
    transport.always(
        Method::Get,
        DELETED,
        Reply::ok(page_envelope(&[category(1, "Held")], 1)),
    );
    let deleted = Arc::new(collection(&transport, ViewKind::Deleted));

    let first = tokio::spawn({
        let deleted = Arc::clone(&deleted);
        async move { deleted.load(PageRequest::new(0, 10)?).await }
    });
    while !deleted.is_loading() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let second = deleted.load(PageRequest::new(0, 10)?).await;
    assert_eq!(
        second,
        Err(SyncError::LoadInFlight {
            view: "categories/deleted".into()
        })
    );

    gate.add_permits(1);
    first.await??;
    assert_eq!(transport.count(DELETED), 1);
    assert!(!deleted.is_loading());
    Ok(())
}

#[tokio::test]
async fn reload_when_idle_waits_for_in_flight_load() -> anyhow::Result<()> {
    let transport = ScriptedTransport::new();
    let gate = transport.gate(Method::Get, DELETED);
    transport.always(
        Method::Get,
        DELETED,
        Reply::ok(page_envelope(&[category(1, "Held")], 1)),
    );
    let deleted = Arc::new(collection(&transport, ViewKind::Deleted));

    let first = tokio::spawn({
        let deleted = Arc::clone(&deleted);
        async move { deleted.load(PageRequest::new(0, 10)?).await }
    });
    while !deleted.is_loading() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    let queued = tokio::spawn({
        let deleted = Arc::clone(&deleted);
        async move { deleted.reload_when_idle().await }
    });

    gate.add_permits(2);
    first.await??;
    queued.await??;
    assert_eq!(transport.count(DELETED), 2);
    Ok(())
}

#[tokio::test]
async fn phone_asset_paths_resolve_against_upload_base() -> anyhow::Result<()> {
    let transport = ScriptedTransport::new();
    let mut row = phone(7, "Pixel", 10.0, 1);
    row.avatar_url = Some("front.png".into());
    row.image_urls = vec!["https://cdn.example.com/side.png".into()];
    transport.push_get("/phones/all-page", Reply::ok(page_envelope(&[row], 1)));
    let dyn_transport: Arc<dyn Transport> = transport.clone();
    let phones = PagedCollection::<Phone>::new(
        dyn_transport,
        Arc::new(ResourceEndpoints::phones()),
        ViewKind::Active,
        &SyncConfig::default(),
    )?;

    phones.load(PageRequest::new(0, 10)?).await?;

    let state = phones.snapshot();
    let loaded = &state.result.items[0];
    assert_eq!(
        loaded.avatar_url.as_deref(),
        Some("http://localhost:9999/uploads/front.png")
    );
    assert_eq!(loaded.image_urls, vec!["https://cdn.example.com/side.png".to_string()]);
    Ok(())
}
