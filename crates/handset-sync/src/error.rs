//! Error and warning types shared by the engine.
//!
//! # Design
//! - Failures that stop an operation are `thiserror` enums.
//! - Degradations the caller should hear about without failing are [`Warning`] values.

use std::fmt::Display;

use handset_api_models::EntityId;
use thiserror::Error;

/// No response reached the caller (connection refused, DNS, timeout, unreadable body).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("request to {target} failed: {detail}")]
pub struct TransportFailure {
    /// Path or URL that was being requested.
    pub target: String,
    /// Underlying client error rendered as text.
    pub detail: String,
}

impl TransportFailure {
    /// Build a failure for `target` from any displayable cause.
    #[must_use]
    pub fn new(target: impl Into<String>, detail: impl Display) -> Self {
        Self {
            target: target.into(),
            detail: detail.to_string(),
        }
    }
}

/// Failure to download a stored asset.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The asset request never produced a response.
    #[error(transparent)]
    Transport(#[from] TransportFailure),
    /// The asset host answered with a non-success status.
    #[error("asset request returned status {status}")]
    Status {
        /// HTTP status returned by the asset host.
        status: u16,
    },
}

/// Invalid engine configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A base URL could not be parsed or cannot carry paths.
    #[error("invalid URL for {field}: {reason}")]
    InvalidUrl {
        /// Configuration field holding the URL.
        field: &'static str,
        /// Offending value.
        value: String,
        /// Parser diagnostic.
        reason: String,
    },
    /// Page sizes must be positive.
    #[error("default page size must be greater than zero")]
    ZeroPageSize,
    /// Requests need a finite, non-zero timeout.
    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
    /// Fallback policy allows no attempts at all.
    #[error("fallback policy must allow at least one attempt")]
    NoAttempts,
    /// HTTP client construction failed.
    #[error("failed to build HTTP client: {detail}")]
    Client {
        /// Builder diagnostic.
        detail: String,
    },
}

/// Failure of a paged load.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyncError {
    /// A load for the same view has not settled yet.
    #[error("a load is already in flight for {view}")]
    LoadInFlight {
        /// View label, e.g. `categories/deleted`.
        view: String,
    },
    /// Backend answered with a non-success envelope or status.
    #[error("backend rejected the request (status {status}): {message}")]
    Backend {
        /// Envelope code when the body carried one.
        code: Option<i32>,
        /// HTTP status.
        status: u16,
        /// Backend message or a synthesised description.
        message: String,
    },
    /// No response reached the caller.
    #[error(transparent)]
    Transport(#[from] TransportFailure),
    /// Page requests need a positive size.
    #[error("page size must be greater than zero")]
    InvalidPageSize,
}

/// Failure of a create/update/delete/restore call or a single-record read.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OperationError {
    /// Backend answered with a non-success envelope or status.
    #[error("{message}")]
    Backend {
        /// Envelope code when the body carried one.
        code: Option<i32>,
        /// HTTP status.
        status: u16,
        /// Backend message when available.
        message: String,
    },
    /// Backend reported that the query matched nothing.
    #[error("no record matched the request to {target}")]
    NotFound {
        /// Path that was requested.
        target: String,
    },
    /// Response could not be interpreted and the status signalled failure.
    #[error("unreadable response (status {status}): {detail}")]
    UnreadableResponse {
        /// HTTP status.
        status: u16,
        /// Decoder diagnostic.
        detail: String,
    },
    /// No response reached the caller.
    #[error(transparent)]
    Transport(#[from] TransportFailure),
}

/// Non-fatal degradation reported alongside a successful operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Warning {
    /// A list response did not match the expected shape; the view shows an empty page.
    #[error("{view}: unexpected response shape ({detail})")]
    StructuralMismatch {
        /// View label.
        view: String,
        /// Decoder diagnostic.
        detail: String,
    },
    /// The primary list path failed and the alternate path was queried instead.
    #[error("served from alternate endpoint {path} ({cause})")]
    AlternateEndpoint {
        /// Alternate path that was used.
        path: String,
        /// Failure of the primary path.
        cause: String,
    },
    /// Backend returned more rows than requested; the extra rows were dropped.
    #[error("backend returned {received} rows for a page of {expected}")]
    OversizedPage {
        /// Requested page size.
        expected: u32,
        /// Rows received.
        received: usize,
    },
    /// A stored asset could not be downloaded and was left out of the submission.
    #[error("dropped {field} attachment {url}: {cause}")]
    AttachmentDropped {
        /// Multipart field the asset belonged to.
        field: String,
        /// Asset URL.
        url: String,
        /// Download failure.
        cause: String,
    },
    /// The same identifiers appear in both the active and the deleted view.
    #[error("ids present in both views: {ids:?}")]
    ViewOverlap {
        /// Identifiers present in both views.
        ids: Vec<EntityId>,
    },
    /// A mutation succeeded but its response body could not be parsed.
    #[error("mutation applied but response was unreadable ({detail})")]
    UnparsedMutationResponse {
        /// Decoder diagnostic.
        detail: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failure_renders_target_and_cause() {
        let failure = TransportFailure::new("/categories/all-page", "connection refused");
        assert_eq!(
            failure.to_string(),
            "request to /categories/all-page failed: connection refused"
        );
    }

    #[test]
    fn warnings_render_human_readable_text() {
        let warning = Warning::AttachmentDropped {
            field: "files".into(),
            url: "http://cdn/x.png".into(),
            cause: "asset request returned status 404".into(),
        };
        assert!(warning.to_string().contains("dropped files attachment"));
        let as_error: &dyn std::error::Error = &warning;
        assert!(as_error.source().is_none());
        assert_eq!(
            Warning::ViewOverlap { ids: vec![4, 7] }.to_string(),
            "ids present in both views: [4, 7]"
        );
    }
}
