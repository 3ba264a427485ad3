//! Response and body helpers shared by the route modules
//!
//! All responses are JSON with the `{status, data}` envelope the SPA
//! expects; errors carry `{status: "error", message}`. Domain errors map
//! onto status codes via `LearngateError::status_code`.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::types::LearngateError;

pub type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Upper bound on request body size
const MAX_BODY_BYTES: usize = 65536;

#[derive(Serialize)]
struct SuccessEnvelope<T: Serialize> {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<usize>,
    data: T,
}

#[derive(Serialize)]
struct ErrorEnvelope {
    status: &'static str,
    message: String,
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<BoxBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
        .body(full_body(json))
        .unwrap()
}

/// `{status: "success", data}` response
pub fn success<T: Serialize>(status: StatusCode, data: &T) -> Response<BoxBody> {
    json_response(
        status,
        &SuccessEnvelope {
            status: "success",
            results: None,
            data,
        },
    )
}

/// `{status: "success", results, data}` response for collections
pub fn success_list<T: Serialize>(status: StatusCode, data: &[T]) -> Response<BoxBody> {
    json_response(
        status,
        &SuccessEnvelope {
            status: "success",
            results: Some(data.len()),
            data,
        },
    )
}

/// Empty body with the given status (204 and friends)
pub fn empty(status: StatusCode) -> Response<BoxBody> {
    Response::builder()
        .status(status)
        .header("Access-Control-Allow-Origin", "*")
        .body(empty_body())
        .unwrap()
}

/// Map a domain error onto its HTTP response, logging server-side faults
pub fn error_response(err: LearngateError) -> Response<BoxBody> {
    let status = err.status_code();
    if status.is_server_error() {
        error!("Request failed: {}", err);
    }

    json_response(
        status,
        &ErrorEnvelope {
            status: "error",
            message: err.to_string(),
        },
    )
}

pub fn not_found(path: &str) -> Response<BoxBody> {
    error_response(LearngateError::NotFound(format!("No route for {}", path)))
}

pub fn cors_preflight() -> Response<BoxBody> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
        .header("Access-Control-Max-Age", "86400")
        .body(empty_body())
        .unwrap()
}

pub fn full_body(data: impl Into<Bytes>) -> BoxBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

pub fn empty_body() -> BoxBody {
    Full::new(Bytes::new())
        .map_err(|never| match never {})
        .boxed()
}

/// Collect and deserialize a JSON request body
pub async fn parse_json_body<T: for<'de> Deserialize<'de>>(
    req: Request<hyper::body::Incoming>,
) -> Result<T, LearngateError> {
    let body = req
        .collect()
        .await
        .map_err(|e| LearngateError::Http(format!("Failed to read body: {}", e)))?;

    let bytes = body.to_bytes();
    if bytes.len() > MAX_BODY_BYTES {
        return Err(LearngateError::Http("Request body too large".into()));
    }

    serde_json::from_slice(&bytes)
        .map_err(|e| LearngateError::Validation(format!("Invalid JSON body: {}", e)))
}
