//! Single-record reads used when preparing edit forms.

use handset_api_models::{Category, EntityId, ListPayload};

use crate::entity::{AssetBase, SyncEntity};
use crate::envelope::decode;
use crate::error::OperationError;
use crate::page::{PageRequest, SCAN_PAGE_SIZE};
use crate::resource::{ResourceEndpoints, ViewKind};
use crate::transport::{ApiRequest, Transport};

const CATEGORY_SCAN_MAX_PAGES: u32 = 20;

/// Load one record by identifier, resolving its asset paths.
///
/// # Errors
///
/// - [`OperationError::NotFound`] when the backend reports an empty result.
/// - Any other [`OperationError`] for failed or unreadable responses.
pub async fn fetch_by_id<E: SyncEntity>(
    transport: &dyn Transport,
    endpoints: &ResourceEndpoints,
    assets: &AssetBase,
    id: EntityId,
) -> Result<E, OperationError> {
    let path = endpoints.by_id(id);
    tracing::debug!(%path, "fetching record");
    let mut record: E = decode(transport.execute(ApiRequest::get(path.as_str())).await)
        .into_record(&path)?;
    record.resolve_assets(assets);
    Ok(record)
}

/// Identifier of the active category named exactly `name`.
///
/// Scans the active category list page by page; gives up after a fixed number
/// of pages.
///
/// # Errors
///
/// Returns [`OperationError`] when a page request fails.
pub async fn find_category_id(
    transport: &dyn Transport,
    name: &str,
) -> Result<Option<EntityId>, OperationError> {
    let endpoints = ResourceEndpoints::categories();
    let (path, _) = endpoints.list(ViewKind::Active);
    let mut seen: u64 = 0;

    for index in 0..CATEGORY_SCAN_MAX_PAGES {
        let page = PageRequest::first(SCAN_PAGE_SIZE).at(index);
        let request = ApiRequest::get(path)
            .with_query("page", page.index())
            .with_query("size", page.size());
        let outcome = decode::<ListPayload<Category>>(transport.execute(request).await);
        let payload = match outcome.into_record(path) {
            Ok(payload) => payload,
            Err(OperationError::NotFound { .. }) => return Ok(None),
            Err(err) => return Err(err),
        };

        let (items, total) = payload.into_parts();
        if let Some(category) = items.iter().find(|category| category.name == name) {
            return Ok(Some(category.id));
        }
        seen += u64::try_from(items.len()).unwrap_or(u64::MAX);
        if items.is_empty() || seen >= total {
            return Ok(None);
        }
    }
    tracing::debug!(%name, "category scan stopped at page limit");
    Ok(None)
}
