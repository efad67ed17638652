//! Backend reachability probe.

use serde::Serialize;
use serde_json::Value;

use crate::envelope::{Outcome, decode};
use crate::transport::{ApiRequest, Transport};

/// Paths tried when no candidates are given.
pub const DEFAULT_PROBE_PATHS: [&str; 3] =
    ["/categories/list", "/categories", "/categories/all-list"];

/// Result of probing one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeAttempt {
    /// Path requested.
    pub path: String,
    /// HTTP status, when a response arrived.
    pub status: Option<u16>,
    /// Classification of the response (`success`, `backend_error`, ...).
    pub outcome: &'static str,
    /// Failure description; `None` on success.
    pub detail: Option<String>,
}

impl ProbeAttempt {
    /// Whether the path answered with a success envelope.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.detail.is_none()
    }
}

/// Attempts in order, up to and including the first working path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    /// Every path tried.
    pub attempts: Vec<ProbeAttempt>,
    /// First path that answered with a success envelope.
    pub working: Option<String>,
}

/// GET each candidate in order until one answers with a success envelope.
pub async fn probe(transport: &dyn Transport, candidates: &[&str]) -> ProbeReport {
    let mut report = ProbeReport::default();
    for path in candidates {
        let response = transport.execute(ApiRequest::get(*path)).await;
        let status = response.as_ref().ok().map(|raw| raw.status);
        let outcome = decode::<Value>(response);
        let detail = match &outcome {
            Outcome::Success(_) => None,
            Outcome::EmptyResult => Some("backend reported an empty result".to_string()),
            Outcome::BackendError { message, .. } => Some(message.clone()),
            Outcome::TransportFailure(failure) => Some(failure.to_string()),
            Outcome::StructuralMismatch { detail, .. } => Some(detail.clone()),
        };
        tracing::debug!(path, status = ?status, outcome = outcome.kind(), "probed endpoint");

        let attempt = ProbeAttempt {
            path: (*path).to_string(),
            status,
            outcome: outcome.kind(),
            detail,
        };
        let found = attempt.succeeded();
        report.attempts.push(attempt);
        if found {
            report.working = Some((*path).to_string());
            break;
        }
    }
    report
}
