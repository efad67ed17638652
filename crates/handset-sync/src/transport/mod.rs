//! Request/response seam between the engine and the HTTP client.
//!
//! # Design
//! - The engine builds transport-neutral [`ApiRequest`] values and classifies raw
//!   responses itself, so any client that can move bytes can sit behind [`Transport`].
//! - [`HttpTransport`] is the production implementation on top of `reqwest`.

mod http;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AssetError, TransportFailure};

pub use http::HttpTransport;

/// HTTP verbs used by the backend surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl Method {
    /// Upper-case verb name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// One binary multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryPart {
    /// Multipart field name (`avatar` or `files`).
    pub field: String,
    /// Filename reported to the backend.
    pub filename: String,
    /// MIME type of the content.
    pub mime_type: String,
    /// Raw content.
    pub bytes: Vec<u8>,
}

/// Multipart body: scalar fields followed by binary parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    /// Scalar `(name, value)` fields in submission order.
    pub fields: Vec<(String, String)>,
    /// Binary parts in submission order.
    pub parts: Vec<BinaryPart>,
}

/// Request body variants.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No body.
    Empty,
    /// JSON document.
    Json(Value),
    /// `multipart/form-data` document.
    Multipart(MultipartForm),
}

/// Transport-neutral request relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP verb.
    pub method: Method,
    /// Path below the API base, starting with `/`.
    pub path: String,
    /// Query parameters in order.
    pub query: Vec<(String, String)>,
    /// Body.
    pub body: RequestBody,
}

impl ApiRequest {
    /// GET request without query parameters.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Request with an empty body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    /// Append a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    /// Replace the body.
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// `METHOD path` label used in logs and errors.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.method.as_str(), self.path)
    }
}

/// Response as received, before envelope classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Downloaded asset content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedAsset {
    /// Raw content.
    pub bytes: Vec<u8>,
    /// MIME type reported by the asset host, without parameters.
    pub mime_type: Option<String>,
}

/// Request/response client used by every engine component.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send an API request and return whatever response arrived.
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse, TransportFailure>;

    /// Download a stored asset by absolute URL.
    async fn fetch_asset(&self, url: &str) -> Result<FetchedAsset, AssetError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_accumulates_query_in_order() {
        let request = ApiRequest::get("/phones/all-page")
            .with_query("page", 2)
            .with_query("size", 10);
        assert_eq!(
            request.query,
            vec![
                ("page".to_string(), "2".to_string()),
                ("size".to_string(), "10".to_string())
            ]
        );
        assert_eq!(request.label(), "GET /phones/all-page");
    }

    #[test]
    fn raw_response_success_range() {
        assert!(RawResponse { status: 204, body: Vec::new() }.is_success());
        assert!(!RawResponse { status: 404, body: Vec::new() }.is_success());
    }
}
