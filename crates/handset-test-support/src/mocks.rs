//! Scripted in-memory transport.
//!
//! Responses are queued per `METHOD path`; queued replies are consumed in
//! order, after which the sticky reply (if any) answers every further call.
//! Unscripted requests fail at the transport level.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use handset_sync::{
    ApiRequest, AssetError, FetchedAsset, Method, RawResponse, Transport, TransportFailure,
};
use serde_json::Value;
use tokio::sync::Semaphore;

/// Scripted reply to one request.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Response with a JSON body.
    Json {
        /// HTTP status.
        status: u16,
        /// Body.
        body: Value,
    },
    /// Response with a raw body.
    Raw {
        /// HTTP status.
        status: u16,
        /// Body bytes.
        body: Vec<u8>,
    },
    /// Transport failure (no response).
    Refused,
}

impl Reply {
    /// `200` with a JSON body.
    #[must_use]
    pub const fn ok(body: Value) -> Self {
        Self::Json { status: 200, body }
    }

    /// Arbitrary status with a JSON body.
    #[must_use]
    pub const fn status(status: u16, body: Value) -> Self {
        Self::Json { status, body }
    }

    fn into_result(self, target: &str) -> Result<RawResponse, TransportFailure> {
        match self {
            Self::Json { status, body } => Ok(RawResponse {
                status,
                body: serde_json::to_vec(&body).map_err(|err| TransportFailure::new(target, err))?,
            }),
            Self::Raw { status, body } => Ok(RawResponse { status, body }),
            Self::Refused => Err(TransportFailure::new(target, "connection refused")),
        }
    }
}

/// Scripted asset download.
#[derive(Debug, Clone)]
pub enum AssetReply {
    /// Asset content and reported MIME type.
    Found {
        /// Content.
        bytes: Vec<u8>,
        /// MIME type, if the host reports one.
        mime_type: Option<String>,
    },
    /// Non-success status.
    Status(u16),
    /// No response.
    Unreachable,
}

#[derive(Default)]
struct Script {
    queued: HashMap<String, VecDeque<Reply>>,
    sticky: HashMap<String, Reply>,
    assets: HashMap<String, AssetReply>,
    gates: HashMap<String, Arc<Semaphore>>,
    calls: Vec<ApiRequest>,
    asset_calls: Vec<String>,
}

/// Transport answering from a script and recording every call.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<Script>,
}

fn key(method: Method, path: &str) -> String {
    format!("{} {path}", method.as_str())
}

impl ScriptedTransport {
    /// Empty script.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Queue a one-shot reply.
    pub fn push(&self, method: Method, path: &str, reply: Reply) -> &Self {
        self.script()
            .queued
            .entry(key(method, path))
            .or_default()
            .push_back(reply);
        self
    }

    /// Queue a one-shot reply for a GET.
    pub fn push_get(&self, path: &str, reply: Reply) -> &Self {
        self.push(Method::Get, path, reply)
    }

    /// Reply used once the queue for this request is exhausted.
    pub fn always(&self, method: Method, path: &str, reply: Reply) -> &Self {
        self.script().sticky.insert(key(method, path), reply);
        self
    }

    /// Script an asset download.
    pub fn asset(&self, url: &str, reply: AssetReply) -> &Self {
        self.script().assets.insert(url.to_string(), reply);
        self
    }

    /// Hold requests to `METHOD path` until permits are added to the returned semaphore.
    pub fn gate(&self, method: Method, path: &str) -> Arc<Semaphore> {
        let semaphore = Arc::new(Semaphore::new(0));
        self.script()
            .gates
            .insert(key(method, path), Arc::clone(&semaphore));
        semaphore
    }

    /// Every API request received, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<ApiRequest> {
        self.script().calls.clone()
    }

    /// Paths of every API request received, in order.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.script()
            .calls
            .iter()
            .map(|call| call.path.clone())
            .collect()
    }

    /// Number of requests to `path`, any method.
    #[must_use]
    pub fn count(&self, path: &str) -> usize {
        self.script()
            .calls
            .iter()
            .filter(|call| call.path == path)
            .count()
    }

    /// Asset URLs requested, in order.
    #[must_use]
    pub fn asset_calls(&self) -> Vec<String> {
        self.script().asset_calls.clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse, TransportFailure> {
        let key = key(request.method, &request.path);
        let gate = {
            let mut script = self.script();
            script.calls.push(request.clone());
            script.gates.get(&key).cloned()
        };
        if let Some(gate) = gate {
            gate.acquire()
                .await
                .map_err(|err| TransportFailure::new(&request.path, err))?
                .forget();
        }

        let reply = {
            let mut script = self.script();
            let queued = script
                .queued
                .get_mut(&key)
                .and_then(VecDeque::pop_front);
            queued.or_else(|| script.sticky.get(&key).cloned())
        };
        reply.map_or_else(
            || {
                Err(TransportFailure::new(
                    &request.path,
                    format!("no scripted reply for {key}"),
                ))
            },
            |reply| reply.into_result(&request.path),
        )
    }

    async fn fetch_asset(&self, url: &str) -> Result<FetchedAsset, AssetError> {
        let reply = {
            let mut script = self.script();
            script.asset_calls.push(url.to_string());
            script.assets.get(url).cloned()
        };
        match reply {
            Some(AssetReply::Found { bytes, mime_type }) => Ok(FetchedAsset { bytes, mime_type }),
            Some(AssetReply::Status(status)) => Err(AssetError::Status { status }),
            Some(AssetReply::Unreachable) | None => {
                Err(AssetError::Transport(TransportFailure::new(url, "connection refused")))
            }
        }
    }
}
