//! Health and version endpoints
//!
//! - /api/health (and /health) - liveness probe
//! - /version                  - build provenance

use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::config::Args;
use crate::routes::respond::{json_response, BoxBody};

#[derive(Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
    pub mode: &'static str,
    pub timestamp: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionResponse {
    pub version: &'static str,
    pub git_commit: &'static str,
    pub built_at: &'static str,
}

/// Liveness probe: 200 whenever the process is serving
pub fn health_check(args: &Args) -> Response<BoxBody> {
    json_response(
        StatusCode::OK,
        &HealthResponse {
            healthy: true,
            version: env!("CARGO_PKG_VERSION"),
            mode: if args.dev_mode {
                "development"
            } else {
                "production"
            },
            timestamp: chrono::Utc::now().to_rfc3339(),
        },
    )
}

/// Build info embedded at compile time
pub fn version_info() -> Response<BoxBody> {
    json_response(
        StatusCode::OK,
        &VersionResponse {
            version: env!("CARGO_PKG_VERSION"),
            git_commit: env!("GIT_COMMIT_SHORT"),
            built_at: env!("BUILD_TIMESTAMP"),
        },
    )
}
