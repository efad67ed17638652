//! `reqwest`-backed transport.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use uuid::Uuid;

use super::{ApiRequest, FetchedAsset, Method, MultipartForm, RawResponse, RequestBody, Transport};
use crate::config::{SyncConfig, parse_base};
use crate::error::{AssetError, ConfigError, TransportFailure};

const HEADER_REQUEST_ID: &str = "x-request-id";

/// Production transport over a shared `reqwest::Client`.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a client with the configured timeout and a per-session request id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the API base URL is invalid or the client
    /// cannot be constructed.
    pub fn from_config(config: &SyncConfig) -> Result<Self, ConfigError> {
        let mut default_headers = HeaderMap::new();
        let request_id = HeaderValue::from_str(&Uuid::new_v4().to_string()).map_err(|err| {
            ConfigError::Client {
                detail: err.to_string(),
            }
        })?;
        default_headers.insert(HEADER_REQUEST_ID, request_id);

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|err| ConfigError::Client {
                detail: err.to_string(),
            })?;
        Self::with_client(client, &config.api_base_url)
    }

    /// Wrap an existing client.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] when `api_base_url` cannot carry paths.
    pub fn with_client(client: Client, api_base_url: &str) -> Result<Self, ConfigError> {
        let base = parse_base("api_base_url", api_base_url)?;
        Ok(Self {
            client,
            base_url: base.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Absolute URL for an API path.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn builder(&self, method: Method, url: &str) -> RequestBuilder {
        match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Delete => self.client.delete(url),
        }
    }
}

fn multipart(form: MultipartForm, target: &str) -> Result<Form, TransportFailure> {
    let mut multipart = Form::new();
    for (name, value) in form.fields {
        multipart = multipart.text(name, value);
    }
    for part in form.parts {
        let body = Part::bytes(part.bytes)
            .file_name(part.filename)
            .mime_str(&part.mime_type)
            .map_err(|err| TransportFailure::new(target, format!("invalid MIME type: {err}")))?;
        multipart = multipart.part(part.field, body);
    }
    Ok(multipart)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse, TransportFailure> {
        let target = request.path.clone();
        let url = self.endpoint(&request.path);
        tracing::debug!(method = request.method.as_str(), url = %url, "sending API request");

        let mut builder = self.builder(request.method, &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(multipart(form, &target)?),
        };

        let response = builder
            .send()
            .await
            .map_err(|err| TransportFailure::new(&target, err))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|err| TransportFailure::new(&target, err))?;
        tracing::debug!(status, url = %url, bytes = body.len(), "received API response");
        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }

    async fn fetch_asset(&self, url: &str) -> Result<FetchedAsset, AssetError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| TransportFailure::new(url, err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::Status {
                status: status.as_u16(),
            });
        }
        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|err| TransportFailure::new(url, err))?;
        Ok(FetchedAsset {
            bytes: bytes.to_vec(),
            mime_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{BinaryPart, Method};
    use httpmock::prelude::*;
    use serde_json::json;

    fn transport_for(server: &MockServer) -> HttpTransport {
        HttpTransport::with_client(Client::new(), &format!("{}/api/v1", server.base_url()))
            .expect("valid base URL")
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let transport =
            HttpTransport::with_client(Client::new(), "http://localhost:9999/api/v1/")
                .expect("valid base");
        assert_eq!(
            transport.endpoint("/categories/all-page"),
            "http://localhost:9999/api/v1/categories/all-page"
        );
    }

    #[test]
    fn rejects_base_without_path_support() {
        let err = HttpTransport::with_client(Client::new(), "mailto:ops@example.com")
            .expect_err("cannot be a base");
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn execute_sends_query_and_returns_raw_body() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/categories/all-page")
                .query_param("page", "1")
                .query_param("size", "5");
            then.status(200)
                .json_body(json!({"code": 1000, "result": {"content": [], "totalElements": 0}}));
        });

        let response = transport_for(&server)
            .execute(
                ApiRequest::get("/categories/all-page")
                    .with_query("page", 1)
                    .with_query("size", 5),
            )
            .await
            .expect("response");

        mock.assert();
        assert_eq!(response.status, 200);
        let body: serde_json::Value = serde_json::from_slice(&response.body).expect("json");
        assert_eq!(body["code"], 1000);
    }

    #[tokio::test]
    async fn execute_passes_error_statuses_through() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(DELETE).path("/api/v1/phones/delete/4");
            then.status(404)
                .json_body(json!({"code": 1005, "message": "not found"}));
        });

        let response = transport_for(&server)
            .execute(ApiRequest::new(Method::Delete, "/phones/delete/4"))
            .await
            .expect("response");
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn execute_sends_multipart_parts() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/v1/phones/create");
            then.status(200).json_body(json!({"code": 1000}));
        });

        let form = MultipartForm {
            fields: vec![("name".into(), "Pixel".into())],
            parts: vec![BinaryPart {
                field: "avatar".into(),
                filename: "front.png".into(),
                mime_type: "image/png".into(),
                bytes: vec![1, 2, 3],
            }],
        };
        let response = transport_for(&server)
            .execute(
                ApiRequest::new(Method::Post, "/phones/create")
                    .with_body(RequestBody::Multipart(form)),
            )
            .await
            .expect("response");

        mock.assert();
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn fetch_asset_reports_mime_without_parameters() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/uploads/photo.png");
            then.status(200)
                .header("content-type", "image/png; charset=binary")
                .body([137_u8, 80, 78, 71]);
        });

        let asset = transport_for(&server)
            .fetch_asset(&format!("{}/uploads/photo.png", server.base_url()))
            .await
            .expect("asset");
        assert_eq!(asset.mime_type.as_deref(), Some("image/png"));
        assert_eq!(asset.bytes, vec![137, 80, 78, 71]);
    }

    #[tokio::test]
    async fn fetch_asset_surfaces_status_failures() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/uploads/gone.png");
            then.status(410);
        });

        let err = transport_for(&server)
            .fetch_asset(&format!("{}/uploads/gone.png", server.base_url()))
            .await
            .expect_err("status failure");
        assert!(matches!(err, AssetError::Status { status: 410 }));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_failure() {
        let transport = HttpTransport::with_client(Client::new(), "http://127.0.0.1:9/api")
            .expect("valid base");
        let err = transport
            .execute(ApiRequest::get("/categories/list"))
            .await
            .expect_err("connection refused");
        assert_eq!(err.target, "/categories/list");
    }
}
