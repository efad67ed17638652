//! Create/update/delete/restore sequencing.
//!
//! # Design
//! - One mutation per resource at a time; a second caller waits for the first.
//! - The mutating call is never retried here. On success the affected views are
//!   reloaded: the active view for create/update, both views for delete/restore.

use std::sync::Arc;

use handset_api_models::EntityId;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::attachments::{AttachmentSet, reconcile};
use crate::coordinator::{SettleReport, SoftDeleteViews};
use crate::entity::SyncEntity;
use crate::envelope::{Outcome, decode};
use crate::error::{OperationError, Warning};
use crate::transport::{ApiRequest, Method, MultipartForm, RequestBody, Transport};

/// Multipart submission: scalar fields plus attachment slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSubmission {
    /// Scalar `(name, value)` fields in submission order.
    pub fields: Vec<(String, String)>,
    /// Avatar and gallery slots.
    pub attachments: AttachmentSet,
}

/// Body of a create or update.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// JSON document.
    Json(Value),
    /// Multipart form; existing assets are downloaded and re-submitted.
    Form(FormSubmission),
}

/// One logical operation on a resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Create a record.
    Create(Submission),
    /// Replace a record.
    Update {
        /// Record to update.
        id: EntityId,
        /// New content.
        submission: Submission,
    },
    /// Soft-delete a record.
    Delete {
        /// Record to delete.
        id: EntityId,
    },
    /// Bring a soft-deleted record back.
    Restore {
        /// Record to restore.
        id: EntityId,
    },
}

/// Mutation discriminant, for reports and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Create.
    Create,
    /// Update.
    Update,
    /// Soft-delete.
    Delete,
    /// Restore.
    Restore,
}

impl MutationKind {
    /// Lower-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Restore => "restore",
        }
    }

    /// Whether the mutation moves records between the active and deleted sets.
    #[must_use]
    pub const fn crosses_views(self) -> bool {
        matches!(self, Self::Delete | Self::Restore)
    }
}

impl Mutation {
    /// Discriminant.
    #[must_use]
    pub const fn kind(&self) -> MutationKind {
        match self {
            Self::Create(_) => MutationKind::Create,
            Self::Update { .. } => MutationKind::Update,
            Self::Delete { .. } => MutationKind::Delete,
            Self::Restore { .. } => MutationKind::Restore,
        }
    }

    /// Target identifier; `None` for create.
    #[must_use]
    pub const fn id(&self) -> Option<EntityId> {
        match self {
            Self::Create(_) => None,
            Self::Update { id, .. } | Self::Delete { id } | Self::Restore { id } => Some(*id),
        }
    }
}

/// Result of a successful mutation.
#[derive(Debug, PartialEq, Eq)]
pub struct MutationReport {
    /// Operation performed.
    pub kind: MutationKind,
    /// Target identifier; `None` for create.
    pub id: Option<EntityId>,
    /// Warnings raised while submitting (dropped attachments, unreadable response).
    pub warnings: Vec<Warning>,
    /// Reload of the affected views.
    pub settle: SettleReport,
}

impl MutationReport {
    /// Submission warnings followed by settle warnings.
    #[must_use]
    pub fn all_warnings(&self) -> Vec<Warning> {
        let mut warnings = self.warnings.clone();
        warnings.extend(self.settle.warnings());
        warnings
    }
}

/// Runs mutations against one resource and settles its views afterwards.
pub struct MutationOrchestrator<E> {
    transport: Arc<dyn Transport>,
    views: SoftDeleteViews<E>,
    gate: Mutex<()>,
}

impl<E: SyncEntity> MutationOrchestrator<E> {
    /// Orchestrator over `views`, issuing mutations through `transport`.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, views: SoftDeleteViews<E>) -> Self {
        Self {
            transport,
            views,
            gate: Mutex::new(()),
        }
    }

    /// Views settled after each mutation.
    #[must_use]
    pub const fn views(&self) -> &SoftDeleteViews<E> {
        &self.views
    }

    /// Perform one mutation, then reload the affected views.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError`] when the mutating call failed; views are not
    /// reloaded in that case.
    pub async fn perform(&self, mutation: Mutation) -> Result<MutationReport, OperationError> {
        let _gate = self.gate.lock().await;
        let kind = mutation.kind();
        let id = mutation.id();
        let mut warnings = Vec::new();

        let request = self.build_request(mutation, &mut warnings).await;
        let label = request.label();
        tracing::debug!(request = %label, kind = kind.as_str(), "submitting mutation");

        match decode::<Value>(self.transport.execute(request).await) {
            Outcome::StructuralMismatch { status, detail } if (200..300).contains(&status) => {
                tracing::warn!(request = %label, %detail, "mutation accepted but response was unreadable");
                warnings.push(Warning::UnparsedMutationResponse { detail });
            }
            outcome => {
                if let Err(err) = outcome.into_record(&label) {
                    tracing::warn!(request = %label, error = %err, "mutation failed");
                    return Err(err);
                }
            }
        }
        tracing::info!(
            resource = %self.views.endpoints().name,
            kind = kind.as_str(),
            id = ?id,
            "mutation committed"
        );

        let settle = if kind.crosses_views() {
            self.views.reload_both().await
        } else {
            self.views.reload_active().await
        };
        Ok(MutationReport {
            kind,
            id,
            warnings,
            settle,
        })
    }

    async fn build_request(&self, mutation: Mutation, warnings: &mut Vec<Warning>) -> ApiRequest {
        let endpoints = self.views.endpoints();
        match mutation {
            Mutation::Create(submission) => ApiRequest::new(Method::Post, endpoints.create())
                .with_body(self.encode(submission, warnings).await),
            Mutation::Update { id, submission } => {
                let (path, query) = endpoints.update(id);
                let mut request = ApiRequest::new(Method::Put, path)
                    .with_body(self.encode(submission, warnings).await);
                request.query.extend(query);
                request
            }
            Mutation::Delete { id } => ApiRequest::new(Method::Delete, endpoints.delete(id)),
            Mutation::Restore { id } => ApiRequest::new(Method::Put, endpoints.restore(id)),
        }
    }

    async fn encode(&self, submission: Submission, warnings: &mut Vec<Warning>) -> RequestBody {
        match submission {
            Submission::Json(document) => RequestBody::Json(document),
            Submission::Form(form) => {
                let reconciled = reconcile(form.attachments, self.transport.as_ref()).await;
                warnings.extend(reconciled.warnings);
                RequestBody::Multipart(MultipartForm {
                    fields: form.fields,
                    parts: reconciled.parts,
                })
            }
        }
    }
}
