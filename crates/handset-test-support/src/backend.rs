//! In-memory backend with soft-delete semantics for one resource.
//!
//! Behaves like the real service at the envelope level: pages past the end
//! answer code `1005`, deleting a deleted record or restoring a live one is
//! rejected with an error envelope.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use handset_api_models::EntityId;
use handset_sync::{
    ApiRequest, AssetError, FetchedAsset, Method, RawResponse, RequestBody, Transport,
    TransportFailure,
};
use serde_json::{Value, json};

use crate::fixtures::{empty_envelope, error_envelope, page_envelope, success_envelope};

/// Code returned when a delete or restore does not apply to the record's state.
pub const CODE_INVALID_STATE: i32 = 1009;
/// Code returned for unknown identifiers.
pub const CODE_NOT_FOUND: i32 = 1004;

#[derive(Debug, Clone)]
struct Record {
    body: Value,
    deleted: bool,
}

#[derive(Default)]
struct Store {
    records: BTreeMap<EntityId, Record>,
    next_id: EntityId,
    calls: Vec<String>,
}

/// Soft-delete backend for `/{resource}/...` paths.
pub struct FakeBackend {
    resource: String,
    store: Mutex<Store>,
}

impl FakeBackend {
    /// Empty backend serving `resource`.
    #[must_use]
    pub fn new(resource: &str) -> Self {
        Self {
            resource: resource.to_string(),
            store: Mutex::new(Store {
                next_id: 1,
                ..Store::default()
            }),
        }
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Insert a live record named `name`; returns its id.
    pub fn insert(&self, name: &str) -> EntityId {
        let mut store = self.store();
        let id = store.next_id;
        store.next_id += 1;
        store.records.insert(
            id,
            Record {
                body: json!({ "id": id, "name": name }),
                deleted: false,
            },
        );
        id
    }

    /// Insert a soft-deleted record named `name`; returns its id.
    pub fn insert_deleted(&self, name: &str) -> EntityId {
        let id = self.insert(name);
        if let Some(record) = self.store().records.get_mut(&id) {
            record.deleted = true;
        }
        id
    }

    /// Whether `id` is currently soft-deleted; `None` if unknown.
    #[must_use]
    pub fn is_deleted(&self, id: EntityId) -> Option<bool> {
        self.store().records.get(&id).map(|record| record.deleted)
    }

    /// `METHOD path` of every request, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.store().calls.clone()
    }

    fn route(&self, request: &ApiRequest) -> (u16, Value) {
        let prefix = format!("/{}/", self.resource);
        let Some(rest) = request.path.strip_prefix(&prefix) else {
            return (404, error_envelope(CODE_NOT_FOUND, "unknown resource"));
        };
        let segments: Vec<&str> = rest.split('/').collect();
        match (request.method, segments.as_slice()) {
            (Method::Get, ["all-page" | "list"]) => self.page(request, false),
            (Method::Get, ["deleted"]) => self.page(request, true),
            (Method::Post, ["create"]) => self.create(&request.body),
            (Method::Put, ["update", id]) => self.update(parse_id(id), &request.body),
            (Method::Put, ["update"]) => {
                let id = request
                    .query
                    .iter()
                    .find(|(name, _)| name == "id")
                    .and_then(|(_, value)| parse_id(value));
                self.update(id, &request.body)
            }
            (Method::Delete, ["delete", id]) => self.transition(parse_id(id), true),
            (Method::Put, ["restore", id]) => self.transition(parse_id(id), false),
            (Method::Get, [id]) => self.get(parse_id(id)),
            _ => (404, error_envelope(CODE_NOT_FOUND, "no such endpoint")),
        }
    }

    fn page(&self, request: &ApiRequest, deleted: bool) -> (u16, Value) {
        let param = |name: &str, default: usize| {
            request
                .query
                .iter()
                .find(|(key, _)| key == name)
                .and_then(|(_, value)| value.parse().ok())
                .unwrap_or(default)
        };
        let (page, size) = (param("page", 0), param("size", 10).max(1));
        let store = self.store();
        let matching: Vec<&Value> = store
            .records
            .values()
            .filter(|record| record.deleted == deleted)
            .map(|record| &record.body)
            .collect();
        let rows: Vec<&Value> = matching.iter().skip(page * size).take(size).copied().collect();
        if rows.is_empty() {
            return (200, empty_envelope());
        }
        (
            200,
            page_envelope(&rows, u64::try_from(matching.len()).unwrap_or(u64::MAX)),
        )
    }

    fn get(&self, id: Option<EntityId>) -> (u16, Value) {
        match id.and_then(|id| self.store().records.get(&id).cloned()) {
            Some(record) => (200, success_envelope(record.body)),
            None => not_found(),
        }
    }

    fn create(&self, body: &RequestBody) -> (u16, Value) {
        let Some(name) = submitted_name(body) else {
            return (400, error_envelope(1001, "name is required"));
        };
        let id = self.insert(&name);
        (200, success_envelope(json!({ "id": id, "name": name })))
    }

    fn update(&self, id: Option<EntityId>, body: &RequestBody) -> (u16, Value) {
        let Some(id) = id else {
            return not_found();
        };
        let mut store = self.store();
        let Some(record) = store.records.get_mut(&id) else {
            return not_found();
        };
        if let Some(name) = submitted_name(body) {
            record.body["name"] = Value::String(name);
        }
        (200, success_envelope(record.body.clone()))
    }

    fn transition(&self, id: Option<EntityId>, delete: bool) -> (u16, Value) {
        let Some(id) = id else {
            return not_found();
        };
        let mut store = self.store();
        let Some(record) = store.records.get_mut(&id) else {
            return not_found();
        };
        if record.deleted == delete {
            let message = if delete {
                "record is already deleted"
            } else {
                "record is not deleted"
            };
            return (400, error_envelope(CODE_INVALID_STATE, message));
        }
        record.deleted = delete;
        (200, json!({ "code": handset_api_models::CODE_SUCCESS }))
    }
}

fn not_found() -> (u16, Value) {
    (404, error_envelope(CODE_NOT_FOUND, "record not found"))
}

fn parse_id(text: &str) -> Option<EntityId> {
    text.parse().ok()
}

fn submitted_name(body: &RequestBody) -> Option<String> {
    match body {
        RequestBody::Json(document) => document
            .get("name")
            .and_then(Value::as_str)
            .map(ToString::to_string),
        RequestBody::Multipart(form) => form
            .fields
            .iter()
            .find(|(name, _)| name == "name")
            .map(|(_, value)| value.clone()),
        RequestBody::Empty => None,
    }
}

#[async_trait]
impl Transport for FakeBackend {
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse, TransportFailure> {
        self.store().calls.push(request.label());
        let (status, body) = self.route(&request);
        let body = serde_json::to_vec(&body).map_err(|err| TransportFailure::new(&request.path, err))?;
        Ok(RawResponse { status, body })
    }

    async fn fetch_asset(&self, url: &str) -> Result<FetchedAsset, AssetError> {
        Err(AssetError::Transport(TransportFailure::new(
            url,
            "asset storage is not simulated",
        )))
    }
}
