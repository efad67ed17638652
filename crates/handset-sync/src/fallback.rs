//! Bounded retry policy for empty or out-of-range pages.
//!
//! A page index that was valid before a delete/restore can point past the end
//! of the collection afterwards. The policy sends such loads back to a target
//! page (page 0 by default) a bounded number of times, then settles.

use crate::envelope::Outcome;
use crate::page::PageRequest;

/// Named retry policy for paged loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackPolicy {
    /// Total fetch attempts for one load, the first included.
    pub max_attempts: u8,
    /// Page index a failed load falls back to.
    pub target_page: u32,
    /// HTTP statuses that mean "page or resource not found".
    pub not_found_statuses: Vec<u16>,
    /// Envelope codes that mean "page or resource not found".
    pub not_found_codes: Vec<i32>,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            target_page: 0,
            not_found_statuses: vec![404],
            not_found_codes: Vec::new(),
        }
    }
}

/// What to do after one fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackDecision {
    /// Commit or surface this outcome.
    Settle,
    /// Fetch this page instead.
    Retry(PageRequest),
}

impl FallbackPolicy {
    /// Whether `outcome` is a backend error meaning "not found".
    #[must_use]
    pub fn is_not_found<T>(&self, outcome: &Outcome<T>) -> bool {
        match outcome {
            Outcome::BackendError { code, status, .. } => {
                self.not_found_statuses.contains(status)
                    || code.is_some_and(|code| self.not_found_codes.contains(&code))
            }
            _ => false,
        }
    }

    /// `page` moved to the target index, keeping its size.
    #[must_use]
    pub const fn target(&self, page: PageRequest) -> PageRequest {
        page.at(self.target_page)
    }

    /// Decide whether attempt number `attempt` (1-based) at `page` should be retried.
    #[must_use]
    pub fn decide<T>(&self, page: PageRequest, attempt: u8, outcome: &Outcome<T>) -> FallbackDecision {
        let recoverable = matches!(outcome, Outcome::EmptyResult) || self.is_not_found(outcome);
        if recoverable && attempt < self.max_attempts && page.index() != self.target_page {
            FallbackDecision::Retry(self.target(page))
        } else {
            FallbackDecision::Settle
        }
    }
}
