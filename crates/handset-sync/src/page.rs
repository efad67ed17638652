//! Page requests, page results, and the per-view state machine.
//!
//! # Design
//! - [`ViewState`] is plain data; every change goes through [`ViewState::apply`],
//!   a pure `(state, event) -> state` transition that needs no I/O to test.
//! - Page and result are committed together or not at all.

use std::num::NonZeroU32;

use crate::error::SyncError;

/// Page size for internal full-list scans (category lookup, statistics).
pub(crate) const SCAN_PAGE_SIZE: NonZeroU32 = match NonZeroU32::new(100) {
    Some(size) => size,
    None => NonZeroU32::MIN,
};

/// Zero-based page index plus a positive page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    index: u32,
    size: NonZeroU32,
}

impl PageRequest {
    /// Build a request, rejecting a zero page size.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidPageSize`] when `size` is zero.
    pub fn new(index: u32, size: u32) -> Result<Self, SyncError> {
        let size = NonZeroU32::new(size).ok_or(SyncError::InvalidPageSize)?;
        Ok(Self { index, size })
    }

    /// First page with the given size.
    #[must_use]
    pub const fn first(size: NonZeroU32) -> Self {
        Self { index: 0, size }
    }

    /// Zero-based page index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Page size.
    #[must_use]
    pub const fn size(self) -> u32 {
        self.size.get()
    }

    /// Same size, different index.
    #[must_use]
    pub const fn at(self, index: u32) -> Self {
        Self {
            index,
            size: self.size,
        }
    }
}

/// One page of rows plus the size of the whole filtered collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult<E> {
    /// Rows on this page, at most one page size long.
    pub items: Vec<E>,
    /// Count across the whole active or deleted collection.
    pub total_count: u64,
}

impl<E> PageResult<E> {
    /// No rows, zero total.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
        }
    }
}

impl<E> Default for PageResult<E> {
    fn default() -> Self {
        Self::empty()
    }
}

/// State of one paged view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState<E> {
    /// Page the committed result belongs to.
    pub current_page: PageRequest,
    /// Last committed result.
    pub result: PageResult<E>,
    /// Whether a load is in flight.
    pub is_loading: bool,
}

impl<E> ViewState<E> {
    /// Idle view on the first page with nothing loaded.
    #[must_use]
    pub const fn new(size: NonZeroU32) -> Self {
        Self {
            current_page: PageRequest::first(size),
            result: PageResult::empty(),
            is_loading: false,
        }
    }

    /// Apply one event.
    ///
    /// A `LoadStarted` while loading, or a `Committed`/`LoadFailed` while idle,
    /// is rejected and leaves the state untouched.
    #[must_use]
    pub fn apply(self, event: ViewEvent<E>) -> Transition<E> {
        match (self.is_loading, event) {
            (false, ViewEvent::LoadStarted) => Transition::accepted(Self {
                is_loading: true,
                ..self
            }),
            (true, ViewEvent::Committed { page, result }) => Transition::accepted(Self {
                current_page: page,
                result,
                is_loading: false,
            }),
            (true, ViewEvent::LoadFailed) => Transition::accepted(Self {
                is_loading: false,
                ..self
            }),
            _ => Transition::rejected(self),
        }
    }
}

/// Events a paged view reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent<E> {
    /// A fetch is about to be issued.
    LoadStarted,
    /// A page and its result settled together.
    Committed {
        /// Page the result belongs to.
        page: PageRequest,
        /// Result to show.
        result: PageResult<E>,
    },
    /// The load failed; the last good result stays.
    LoadFailed,
}

/// Outcome of [`ViewState::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<E> {
    /// State after the event.
    pub state: ViewState<E>,
    /// Whether the event was accepted.
    pub accepted: bool,
}

impl<E> Transition<E> {
    const fn accepted(state: ViewState<E>) -> Self {
        Self {
            state,
            accepted: true,
        }
    }

    const fn rejected(state: ViewState<E>) -> Self {
        Self {
            state,
            accepted: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(value: u32) -> NonZeroU32 {
        NonZeroU32::new(value).expect("non-zero")
    }

    #[test]
    fn page_request_rejects_zero_size() {
        assert_eq!(PageRequest::new(3, 0), Err(SyncError::InvalidPageSize));
        let page = PageRequest::new(3, 20).expect("valid");
        assert_eq!((page.index(), page.size()), (3, 20));
        assert_eq!(page.at(0).size(), 20);
    }

    #[test]
    fn second_load_is_rejected_while_first_is_in_flight() {
        let state = ViewState::<u32>::new(size(10));
        let started = state.apply(ViewEvent::LoadStarted);
        assert!(started.accepted);
        let again = started.state.apply(ViewEvent::LoadStarted);
        assert!(!again.accepted);
        assert!(again.state.is_loading);
    }

    #[test]
    fn commit_replaces_page_and_result_together() {
        let loading = ViewState::new(size(10)).apply(ViewEvent::LoadStarted).state;
        let page = PageRequest::new(2, 10).expect("page");
        let committed = loading.apply(ViewEvent::Committed {
            page,
            result: PageResult {
                items: vec![7, 8],
                total_count: 22,
            },
        });
        assert!(committed.accepted);
        assert_eq!(committed.state.current_page, page);
        assert_eq!(committed.state.result.items, vec![7, 8]);
        assert!(!committed.state.is_loading);
    }

    #[test]
    fn failure_keeps_last_good_result() {
        let mut state = ViewState::new(size(10));
        state.result = PageResult {
            items: vec![1],
            total_count: 1,
        };
        let failed = state
            .apply(ViewEvent::LoadStarted)
            .state
            .apply(ViewEvent::LoadFailed);
        assert!(failed.accepted);
        assert_eq!(failed.state.result.items, vec![1]);
        assert!(!failed.state.is_loading);
    }

    #[test]
    fn commit_without_pending_load_is_rejected() {
        let idle = ViewState::new(size(10));
        let outcome = idle.clone().apply(ViewEvent::Committed {
            page: PageRequest::first(size(10)),
            result: PageResult {
                items: vec![1],
                total_count: 1,
            },
        });
        assert!(!outcome.accepted);
        assert_eq!(outcome.state, idle);
    }
}
