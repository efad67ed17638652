#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Synchronisation engine for the phone-inventory admin backend.
//!
//! Keeps an active and a soft-deleted paged view of each resource consistent
//! across mutations, and rebuilds multipart submissions whose attachments mix
//! fresh uploads with assets already held in upload storage.
//!
//! Layout:
//! - `envelope.rs`: classification of `{ code, result }` responses
//! - `transport/`: the request/response seam and its reqwest implementation
//! - `page.rs`: page requests, results and the per-view state machine
//! - `fallback.rs`: bounded page-0 retry policy
//! - `collection.rs`: paged collection controller (one per view)
//! - `coordinator.rs`: active + deleted view pair
//! - `attachments.rs`: stored-asset filename grammar and attachment reconciliation
//! - `orchestrator.rs`: create/update/delete/restore sequencing
//! - `lookup.rs`, `probe.rs`, `stats.rs`: single-record reads, endpoint probing, inventory totals

pub mod attachments;
pub mod collection;
pub mod config;
pub mod coordinator;
pub mod entity;
pub mod envelope;
pub mod error;
pub mod fallback;
pub mod lookup;
pub mod orchestrator;
pub mod page;
pub mod probe;
pub mod resource;
pub mod stats;
pub mod transport;

pub use attachments::{
    AVATAR_FIELD, AttachmentSet, AttachmentSlot, DEFAULT_ASSET_MIME, GALLERY_FIELD, Reconciled,
    extract_original_name, filename_from_url, reconcile,
};
pub use collection::{LoadReport, PagedCollection};
pub use config::SyncConfig;
pub use coordinator::{SettleReport, SoftDeleteViews};
pub use entity::{AssetBase, SyncEntity};
pub use envelope::{Outcome, decode};
pub use error::{AssetError, ConfigError, OperationError, SyncError, TransportFailure, Warning};
pub use fallback::{FallbackDecision, FallbackPolicy};
pub use lookup::{fetch_by_id, find_category_id};
pub use orchestrator::{
    FormSubmission, Mutation, MutationKind, MutationOrchestrator, MutationReport, Submission,
};
pub use page::{PageRequest, PageResult, Transition, ViewEvent, ViewState};
pub use probe::{DEFAULT_PROBE_PATHS, ProbeAttempt, ProbeReport, probe};
pub use resource::{ResourceEndpoints, UpdateAddressing, ViewKind};
pub use stats::{InventoryStats, collect_stats};
pub use transport::{
    ApiRequest, BinaryPart, FetchedAsset, HttpTransport, Method, MultipartForm, RawResponse,
    RequestBody, Transport,
};
