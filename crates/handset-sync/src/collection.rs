//! Paged collection controller: one instance per (resource, view).
//!
//! # Design
//! - State lives behind a short-lived lock and changes only through
//!   [`ViewState::apply`]; the lock is never held across an await.
//! - At most one load per view is in flight. A second `load` is rejected with
//!   [`SyncError::LoadInFlight`]; [`PagedCollection::reload_when_idle`] waits for
//!   the in-flight load to settle and then reloads.
//! - Empty or not-found pages beyond the first go through the [`FallbackPolicy`].
//!   Once a load has fallen back it always commits at the target page, even
//!   when the retry fails.

use std::num::NonZeroU32;
use std::sync::{Arc, Mutex, PoisonError};

use handset_api_models::{EntityId, ListPayload};
use tokio::sync::Notify;

use crate::config::SyncConfig;
use crate::entity::{AssetBase, SyncEntity};
use crate::envelope::{Outcome, decode};
use crate::error::{SyncError, Warning};
use crate::fallback::{FallbackDecision, FallbackPolicy};
use crate::page::{PageRequest, PageResult, ViewEvent, ViewState};
use crate::resource::{ResourceEndpoints, ViewKind};
use crate::transport::{ApiRequest, Transport};

/// Summary of a settled load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Page the caller asked for.
    pub requested: PageRequest,
    /// Page that was committed.
    pub page: PageRequest,
    /// Rows committed.
    pub rows: usize,
    /// Committed total count.
    pub total_count: u64,
    /// Whether the fallback policy redirected the load.
    pub fell_back: bool,
    /// Degradations encountered on the way.
    pub warnings: Vec<Warning>,
}

struct Resolution<E> {
    page: PageRequest,
    result: PageResult<E>,
    fell_back: bool,
    warnings: Vec<Warning>,
}

struct FailedLoad {
    error: SyncError,
    /// Page to commit empty instead of keeping the last result.
    reset: Option<PageRequest>,
}

/// Controller for one paged view.
pub struct PagedCollection<E> {
    label: String,
    view: ViewKind,
    endpoints: Arc<ResourceEndpoints>,
    transport: Arc<dyn Transport>,
    policy: FallbackPolicy,
    assets: AssetBase,
    state: Mutex<ViewState<E>>,
    idle: Notify,
}

impl<E: SyncEntity> PagedCollection<E> {
    /// Idle controller positioned on the first page of the configured size.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidPageSize`] when the configured page size is zero.
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoints: Arc<ResourceEndpoints>,
        view: ViewKind,
        config: &SyncConfig,
    ) -> Result<Self, SyncError> {
        let size = NonZeroU32::new(config.default_page_size).ok_or(SyncError::InvalidPageSize)?;
        Ok(Self {
            label: endpoints.view_label(view),
            view,
            endpoints,
            transport,
            policy: config.fallback.clone(),
            assets: AssetBase::new(&config.upload_base_url),
            state: Mutex::new(ViewState::new(size)),
            idle: Notify::new(),
        })
    }

    /// View label, e.g. `categories/active`.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Which set this view shows.
    #[must_use]
    pub const fn view(&self) -> ViewKind {
        self.view
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> ViewState<E> {
        self.lock().clone()
    }

    /// Page the committed result belongs to.
    #[must_use]
    pub fn current_page(&self) -> PageRequest {
        self.lock().current_page
    }

    /// Whether a load is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.lock().is_loading
    }

    /// Identifiers on the committed page.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        self.lock()
            .result
            .items
            .iter()
            .map(SyncEntity::entity_id)
            .collect()
    }

    /// Fetch `page` and commit the result.
    ///
    /// # Errors
    ///
    /// - [`SyncError::LoadInFlight`] when another load on this view has not settled.
    /// - [`SyncError::Backend`] / [`SyncError::Transport`] when the fetch failed.
    ///   The last committed result is kept, unless the load had already fallen
    ///   back; then an empty page is committed at the target index.
    pub async fn load(&self, page: PageRequest) -> Result<LoadReport, SyncError> {
        if !self.dispatch(ViewEvent::LoadStarted) {
            tracing::debug!(view = %self.label, "load rejected while another is in flight");
            return Err(SyncError::LoadInFlight {
                view: self.label.clone(),
            });
        }
        let mut pending = PendingLoad {
            collection: self,
            settled: false,
        };

        match self.resolve(page).await {
            Ok(resolution) => {
                let report = LoadReport {
                    requested: page,
                    page: resolution.page,
                    rows: resolution.result.items.len(),
                    total_count: resolution.result.total_count,
                    fell_back: resolution.fell_back,
                    warnings: resolution.warnings,
                };
                pending.settle(ViewEvent::Committed {
                    page: resolution.page,
                    result: resolution.result,
                });
                tracing::debug!(
                    view = %self.label,
                    page = report.page.index(),
                    rows = report.rows,
                    total = report.total_count,
                    fell_back = report.fell_back,
                    "page committed"
                );
                Ok(report)
            }
            Err(FailedLoad {
                error,
                reset: Some(target),
            }) => {
                pending.settle(ViewEvent::Committed {
                    page: target,
                    result: PageResult::empty(),
                });
                tracing::warn!(
                    view = %self.label,
                    page = target.index(),
                    %error,
                    "fallback page load failed, committed empty page"
                );
                Err(error)
            }
            Err(FailedLoad { error, reset: None }) => {
                pending.settle(ViewEvent::LoadFailed);
                tracing::warn!(view = %self.label, %error, "page load failed");
                Err(error)
            }
        }
    }

    /// Load the current page again.
    ///
    /// # Errors
    ///
    /// Same as [`PagedCollection::load`].
    pub async fn reload(&self) -> Result<LoadReport, SyncError> {
        self.load(self.current_page()).await
    }

    /// Reload the current page, first waiting out any load already in flight.
    ///
    /// # Errors
    ///
    /// Same as [`PagedCollection::load`], except that `LoadInFlight` is never returned.
    pub async fn reload_when_idle(&self) -> Result<LoadReport, SyncError> {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            match self.reload().await {
                Err(SyncError::LoadInFlight { .. }) => notified.await,
                settled => return settled,
            }
        }
    }

    async fn resolve(&self, page: PageRequest) -> Result<Resolution<E>, FailedLoad> {
        let mut warnings = Vec::new();
        let mut request = page;
        let mut attempt: u8 = 1;
        loop {
            let outcome = self.fetch(request, &mut warnings).await;
            match self.policy.decide(request, attempt, &outcome) {
                FallbackDecision::Retry(next) => {
                    tracing::warn!(
                        view = %self.label,
                        from = request.index(),
                        to = next.index(),
                        outcome = outcome.kind(),
                        "page unavailable, falling back"
                    );
                    request = next;
                    attempt = attempt.saturating_add(1);
                }
                FallbackDecision::Settle => {
                    return self.settle(request, outcome, attempt > 1, warnings);
                }
            }
        }
    }

    fn settle(
        &self,
        request: PageRequest,
        outcome: Outcome<PageResult<E>>,
        fell_back: bool,
        mut warnings: Vec<Warning>,
    ) -> Result<Resolution<E>, FailedLoad> {
        let not_found_after_fallback = fell_back && self.policy.is_not_found(&outcome);
        let reset = fell_back.then_some(request);
        let mut page = request;
        let mut result = match outcome {
            Outcome::Success(result) => result,
            Outcome::EmptyResult => PageResult::empty(),
            Outcome::StructuralMismatch { detail, .. } => {
                tracing::warn!(view = %self.label, %detail, "list response had an unexpected shape");
                warnings.push(Warning::StructuralMismatch {
                    view: self.label.clone(),
                    detail,
                });
                page = self.policy.target(request);
                PageResult::empty()
            }
            _ if not_found_after_fallback => PageResult::empty(),
            Outcome::BackendError {
                code,
                status,
                message,
            } => {
                return Err(FailedLoad {
                    error: SyncError::Backend {
                        code,
                        status,
                        message,
                    },
                    reset,
                });
            }
            Outcome::TransportFailure(failure) => {
                return Err(FailedLoad {
                    error: SyncError::Transport(failure),
                    reset,
                });
            }
        };

        let limit = usize::try_from(request.size()).unwrap_or(usize::MAX);
        if result.items.len() > limit {
            warnings.push(Warning::OversizedPage {
                expected: request.size(),
                received: result.items.len(),
            });
            result.items.truncate(limit);
        }

        Ok(Resolution {
            fell_back: fell_back || page != request,
            page,
            result,
            warnings,
        })
    }

    async fn fetch(
        &self,
        request: PageRequest,
        warnings: &mut Vec<Warning>,
    ) -> Outcome<PageResult<E>> {
        let (primary, alternate) = self.endpoints.list(self.view);
        let outcome = self.fetch_path(primary, request).await;
        let Some(alternate) = alternate else {
            return outcome;
        };
        let cause = match &outcome {
            Outcome::TransportFailure(failure) => failure.to_string(),
            Outcome::BackendError { message, .. } if !self.policy.is_not_found(&outcome) => {
                message.clone()
            }
            _ => return outcome,
        };

        tracing::warn!(view = %self.label, path = alternate, %cause, "primary list path failed, trying alternate");
        let retried = self.fetch_path(alternate, request).await;
        match retried {
            Outcome::Success(_) | Outcome::EmptyResult => {
                warnings.push(Warning::AlternateEndpoint {
                    path: alternate.to_string(),
                    cause,
                });
                retried
            }
            _ => outcome,
        }
    }

    async fn fetch_path(&self, path: &str, request: PageRequest) -> Outcome<PageResult<E>> {
        let api_request = ApiRequest::get(path)
            .with_query("page", request.index())
            .with_query("size", request.size());
        tracing::debug!(
            view = %self.label,
            path,
            page = request.index(),
            size = request.size(),
            "fetching page"
        );
        let outcome = decode::<ListPayload<E>>(self.transport.execute(api_request).await);
        outcome.map(|payload| {
            let (mut items, total_count) = payload.into_parts();
            for item in &mut items {
                item.resolve_assets(&self.assets);
            }
            PageResult { items, total_count }
        })
    }

    fn dispatch(&self, event: ViewEvent<E>) -> bool {
        let mut state = self.lock();
        let current = std::mem::replace(&mut *state, ViewState::new(NonZeroU32::MIN));
        let transition = current.apply(event);
        *state = transition.state;
        transition.accepted
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ViewState<E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears the loading flag if a load future is dropped before it settles.
struct PendingLoad<'a, E: SyncEntity> {
    collection: &'a PagedCollection<E>,
    settled: bool,
}

impl<E: SyncEntity> PendingLoad<'_, E> {
    fn settle(&mut self, event: ViewEvent<E>) {
        self.collection.dispatch(event);
        self.settled = true;
        self.collection.idle.notify_waiters();
    }
}

impl<E: SyncEntity> Drop for PendingLoad<'_, E> {
    fn drop(&mut self) {
        if !self.settled {
            self.collection.dispatch(ViewEvent::LoadFailed);
            self.collection.idle.notify_waiters();
        }
    }
}
