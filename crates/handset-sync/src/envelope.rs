//! Classification of the backend's `{ code, result }` envelope.
//!
//! # Design
//! - Every response lands in exactly one [`Outcome`] variant; retry decisions
//!   downstream depend on telling "legitimately empty" apart from "broken".
//! - The envelope code wins over the HTTP status: the backend sends code `1005`
//!   on both 200 and 404 responses.

use handset_api_models::{ApiEnvelope, CODE_EMPTY_RESULT, CODE_SUCCESS};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{OperationError, SyncError, TransportFailure};
use crate::transport::RawResponse;

/// Classified response.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Code `1000` with a payload of the expected shape.
    Success(T),
    /// Backend declared that the query produced no rows.
    EmptyResult,
    /// Response received with a non-success code or status.
    BackendError {
        /// Envelope code, when the body was an envelope.
        code: Option<i32>,
        /// HTTP status.
        status: u16,
        /// Backend message or a synthesised description.
        message: String,
    },
    /// No response reached the caller.
    TransportFailure(TransportFailure),
    /// Success response whose envelope or payload did not match the expected shape.
    StructuralMismatch {
        /// HTTP status.
        status: u16,
        /// Decoder diagnostic.
        detail: String,
    },
}

/// Classify a transport result, decoding the payload as `T`.
///
/// A missing or `null` `result` is decoded as JSON `null`, so payload types that
/// cannot represent `null` report a structural mismatch.
pub fn decode<T: DeserializeOwned>(response: Result<RawResponse, TransportFailure>) -> Outcome<T> {
    let raw = match response {
        Ok(raw) => raw,
        Err(failure) => return Outcome::TransportFailure(failure),
    };

    match serde_json::from_slice::<ApiEnvelope<Value>>(&raw.body) {
        Ok(envelope) => classify(&raw, envelope),
        Err(err) if raw.is_success() => Outcome::StructuralMismatch {
            status: raw.status,
            detail: format!("body is not a response envelope: {err}"),
        },
        Err(_) => Outcome::BackendError {
            code: None,
            status: raw.status,
            message: describe_failure(&raw),
        },
    }
}

fn classify<T: DeserializeOwned>(raw: &RawResponse, envelope: ApiEnvelope<Value>) -> Outcome<T> {
    match envelope.code {
        CODE_EMPTY_RESULT => Outcome::EmptyResult,
        CODE_SUCCESS if raw.is_success() => {
            let payload = envelope.result.unwrap_or(Value::Null);
            match serde_json::from_value::<T>(payload) {
                Ok(value) => Outcome::Success(value),
                Err(err) => Outcome::StructuralMismatch {
                    status: raw.status,
                    detail: format!("unexpected payload: {err}"),
                },
            }
        }
        code => Outcome::BackendError {
            code: Some(code),
            status: raw.status,
            message: envelope
                .message
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| format!("backend returned code {code}")),
        },
    }
}

fn describe_failure(raw: &RawResponse) -> String {
    let text = String::from_utf8_lossy(&raw.body);
    let text = text.trim();
    if text.is_empty() {
        format!("request failed with status {}", raw.status)
    } else {
        format!("{text} (status {})", raw.status)
    }
}

impl<T> Outcome<T> {
    /// Transform the success payload.
    pub fn map<U>(self, op: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Success(value) => Outcome::Success(op(value)),
            Self::EmptyResult => Outcome::EmptyResult,
            Self::BackendError {
                code,
                status,
                message,
            } => Outcome::BackendError {
                code,
                status,
                message,
            },
            Self::TransportFailure(failure) => Outcome::TransportFailure(failure),
            Self::StructuralMismatch { status, detail } => {
                Outcome::StructuralMismatch { status, detail }
            }
        }
    }

    /// Short variant name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::EmptyResult => "empty_result",
            Self::BackendError { .. } => "backend_error",
            Self::TransportFailure(_) => "transport_failure",
            Self::StructuralMismatch { .. } => "structural_mismatch",
        }
    }

    /// Convert a failure variant into a load error; `None` for the non-failure variants.
    #[must_use]
    pub fn load_error(&self) -> Option<SyncError> {
        match self {
            Self::BackendError {
                code,
                status,
                message,
            } => Some(SyncError::Backend {
                code: *code,
                status: *status,
                message: message.clone(),
            }),
            Self::TransportFailure(failure) => Some(SyncError::Transport(failure.clone())),
            _ => None,
        }
    }

    /// Convert into a single-record read result.
    ///
    /// # Errors
    ///
    /// Every non-success variant becomes an [`OperationError`]; an empty result
    /// becomes [`OperationError::NotFound`].
    pub fn into_record(self, target: &str) -> Result<T, OperationError> {
        match self {
            Self::Success(value) => Ok(value),
            Self::EmptyResult => Err(OperationError::NotFound {
                target: target.to_string(),
            }),
            Self::BackendError {
                code,
                status,
                message,
            } => Err(OperationError::Backend {
                code,
                status,
                message,
            }),
            Self::TransportFailure(failure) => Err(OperationError::Transport(failure)),
            Self::StructuralMismatch { status, detail } => {
                Err(OperationError::UnreadableResponse { status, detail })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handset_api_models::{Category, ListPayload};
    use serde_json::json;

    fn raw(status: u16, body: &Value) -> Result<RawResponse, TransportFailure> {
        Ok(RawResponse {
            status,
            body: serde_json::to_vec(body).expect("encode"),
        })
    }

    #[test]
    fn success_code_with_payload_is_success() {
        let outcome: Outcome<ListPayload<Category>> = decode(raw(
            200,
            &json!({"code": 1000, "result": {"content": [{"id": 1, "name": "A"}], "totalElements": 1}}),
        ));
        assert!(matches!(outcome, Outcome::Success(ListPayload::Paged(_))));
    }

    #[test]
    fn empty_result_code_wins_over_status() {
        let ok: Outcome<Value> = decode(raw(200, &json!({"code": 1005})));
        assert_eq!(ok, Outcome::EmptyResult);
        let not_found: Outcome<Value> = decode(raw(404, &json!({"code": 1005})));
        assert_eq!(not_found, Outcome::EmptyResult);
    }

    #[test]
    fn other_codes_are_backend_errors_with_message() {
        let outcome: Outcome<Value> = decode(raw(
            400,
            &json!({"code": 1002, "message": "Category name exists"}),
        ));
        assert_eq!(
            outcome,
            Outcome::BackendError {
                code: Some(1002),
                status: 400,
                message: "Category name exists".into()
            }
        );
    }

    #[test]
    fn backend_error_without_message_gets_synthesised_text() {
        let outcome: Outcome<Value> = decode(raw(200, &json!({"code": 9999})));
        assert!(matches!(
            outcome,
            Outcome::BackendError { code: Some(9999), ref message, .. } if message == "backend returned code 9999"
        ));
    }

    #[test]
    fn transport_errors_pass_through() {
        let failure = TransportFailure::new("/categories/list", "connection refused");
        let outcome: Outcome<Value> = decode(Err(failure.clone()));
        assert_eq!(outcome, Outcome::TransportFailure(failure));
    }

    #[test]
    fn null_payload_for_typed_list_is_a_mismatch() {
        let outcome: Outcome<ListPayload<Category>> =
            decode(raw(200, &json!({"code": 1000, "result": null})));
        assert!(matches!(outcome, Outcome::StructuralMismatch { status: 200, .. }));
    }

    #[test]
    fn null_payload_is_fine_for_untyped_mutations() {
        let outcome: Outcome<Value> = decode(raw(200, &json!({"code": 1000})));
        assert_eq!(outcome, Outcome::Success(Value::Null));
    }

    #[test]
    fn non_envelope_bodies_split_on_status() {
        let ok: Outcome<Value> = decode(Ok(RawResponse {
            status: 200,
            body: b"<html>gateway</html>".to_vec(),
        }));
        assert!(matches!(ok, Outcome::StructuralMismatch { .. }));

        let failed: Outcome<Value> = decode(Ok(RawResponse {
            status: 502,
            body: Vec::new(),
        }));
        assert_eq!(
            failed,
            Outcome::BackendError {
                code: None,
                status: 502,
                message: "request failed with status 502".into()
            }
        );
    }

    #[test]
    fn into_record_maps_empty_to_not_found() {
        let outcome: Outcome<Value> = Outcome::EmptyResult;
        assert_eq!(
            outcome.into_record("/phones/7"),
            Err(OperationError::NotFound {
                target: "/phones/7".into()
            })
        );
    }
}
