//! Active and deleted views of one resource, kept consistent by reloading.
//!
//! Views are never patched locally after a mutation: totals and page
//! boundaries are computed by the backend, so both views reload at their own
//! current page instead.

use std::collections::HashSet;
use std::sync::Arc;

use handset_api_models::EntityId;

use crate::collection::{LoadReport, PagedCollection};
use crate::config::SyncConfig;
use crate::entity::SyncEntity;
use crate::error::{SyncError, Warning};
use crate::resource::{ResourceEndpoints, ViewKind};
use crate::transport::Transport;

/// Outcome of a reload after a mutation.
#[derive(Debug, PartialEq, Eq)]
pub struct SettleReport {
    /// Active view reload.
    pub active: Result<LoadReport, SyncError>,
    /// Deleted view reload, when it was part of the settle.
    pub deleted: Option<Result<LoadReport, SyncError>>,
    /// Identifiers committed in both views after the settle.
    pub overlap: Vec<EntityId>,
}

impl SettleReport {
    /// Warnings from both reloads plus any overlap.
    #[must_use]
    pub fn warnings(&self) -> Vec<Warning> {
        let mut warnings: Vec<Warning> = [Some(&self.active), self.deleted.as_ref()]
            .into_iter()
            .flatten()
            .filter_map(|reload| reload.as_ref().ok())
            .flat_map(|report| report.warnings.iter().cloned())
            .collect();
        if !self.overlap.is_empty() {
            warnings.push(Warning::ViewOverlap {
                ids: self.overlap.clone(),
            });
        }
        warnings
    }

    /// Reload failures, active view first.
    #[must_use]
    pub fn errors(&self) -> Vec<&SyncError> {
        [Some(&self.active), self.deleted.as_ref()]
            .into_iter()
            .flatten()
            .filter_map(|reload| reload.as_ref().err())
            .collect()
    }
}

/// Paired active and deleted views over the same resource.
pub struct SoftDeleteViews<E> {
    endpoints: Arc<ResourceEndpoints>,
    active: PagedCollection<E>,
    deleted: PagedCollection<E>,
}

impl<E: SyncEntity> SoftDeleteViews<E> {
    /// Both views on their first page.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidPageSize`] when the configured page size is zero.
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoints: ResourceEndpoints,
        config: &SyncConfig,
    ) -> Result<Self, SyncError> {
        let endpoints = Arc::new(endpoints);
        Ok(Self {
            active: PagedCollection::new(
                Arc::clone(&transport),
                Arc::clone(&endpoints),
                ViewKind::Active,
                config,
            )?,
            deleted: PagedCollection::new(
                transport,
                Arc::clone(&endpoints),
                ViewKind::Deleted,
                config,
            )?,
            endpoints,
        })
    }

    /// Live records.
    #[must_use]
    pub const fn active(&self) -> &PagedCollection<E> {
        &self.active
    }

    /// Soft-deleted records.
    #[must_use]
    pub const fn deleted(&self) -> &PagedCollection<E> {
        &self.deleted
    }

    /// View by kind.
    #[must_use]
    pub const fn view(&self, kind: ViewKind) -> &PagedCollection<E> {
        match kind {
            ViewKind::Active => &self.active,
            ViewKind::Deleted => &self.deleted,
        }
    }

    /// Endpoint table shared by both views.
    #[must_use]
    pub fn endpoints(&self) -> &ResourceEndpoints {
        &self.endpoints
    }

    /// Reload the active view at its current page.
    pub async fn reload_active(&self) -> SettleReport {
        let active = self.active.reload_when_idle().await;
        self.finish(active, None)
    }

    /// Reload both views at their current pages, concurrently.
    pub async fn reload_both(&self) -> SettleReport {
        let (active, deleted) = tokio::join!(
            self.active.reload_when_idle(),
            self.deleted.reload_when_idle()
        );
        self.finish(active, Some(deleted))
    }

    /// Identifiers committed in both views right now.
    #[must_use]
    pub fn overlap(&self) -> Vec<EntityId> {
        let deleted: HashSet<EntityId> = self.deleted.ids().into_iter().collect();
        self.active
            .ids()
            .into_iter()
            .filter(|id| deleted.contains(id))
            .collect()
    }

    fn finish(
        &self,
        active: Result<LoadReport, SyncError>,
        deleted: Option<Result<LoadReport, SyncError>>,
    ) -> SettleReport {
        let overlap = self.overlap();
        if !overlap.is_empty() {
            tracing::warn!(resource = %self.endpoints.name, ids = ?overlap, "records visible in both views after settle");
        }
        SettleReport {
            active,
            deleted,
            overlap,
        }
    }
}
