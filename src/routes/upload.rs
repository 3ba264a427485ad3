//! HTTP routes for media delivery
//!
//! - GET  /api/upload/video/:courseId/:lessonId - Signed playback URL,
//!   issued only after the access gate allows
//! - POST /api/upload/signature/video           - Direct-upload signature (admin)
//! - POST /api/upload/signature/image           - Direct-upload signature

use hyper::{Method, Request, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{require_admin, require_caller, resolve_caller};
use crate::media::UploadKind;
use crate::routes::respond::{cors_preflight, error_response, success, BoxBody};
use crate::server::AppState;
use crate::types::{parse_object_id, LearngateError, Result};

/// CDN folder for lesson videos
const VIDEO_FOLDER: &str = "learngate/videos";
/// CDN folder for thumbnails and avatars
const IMAGE_FOLDER: &str = "learngate/images";

/// GET /api/upload/video/:courseId/:lessonId
///
/// The gate decides; only then does the adapter sign. The route itself never
/// looks at the lesson.
async fn handle_playback_url(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    course_id: &str,
    lesson_id: &str,
) -> Result<Response<BoxBody>> {
    let caller = require_caller(resolve_caller(&req, &state.jwt))?;
    let course_id = parse_object_id(course_id, "courseId")?;
    let lesson_id = parse_object_id(lesson_id, "lessonId")?;

    let media_id = state
        .gate
        .authorize_playback(&caller, course_id, lesson_id)
        .await?;

    let ttl = Duration::from_secs(state.args.cdn.signed_url_ttl_seconds);
    let url = state.media.signed_playback_url(&media_id, ttl).await?;

    Ok(success(StatusCode::OK, &serde_json::json!({ "url": url })))
}

/// POST /api/upload/signature/video (admin only, course authoring)
async fn handle_video_signature(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>> {
    require_admin(resolve_caller(&req, &state.jwt))?;
    let signature = state.media.upload_signature(VIDEO_FOLDER, UploadKind::Video)?;
    Ok(success(StatusCode::OK, &signature))
}

/// POST /api/upload/signature/image (any authenticated caller, avatars)
async fn handle_image_signature(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>> {
    require_caller(resolve_caller(&req, &state.jwt))?;
    let signature = state.media.upload_signature(IMAGE_FOLDER, UploadKind::Image)?;
    Ok(success(StatusCode::OK, &signature))
}

/// Handle upload/delivery HTTP requests.
///
/// Returns Some(response) if the request was handled, None if not an upload
/// route.
pub async fn handle_upload_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Option<Response<BoxBody>> {
    let path = req.uri().path().to_string();
    let method = req.method().clone();

    if !path.starts_with("/api/upload") {
        return None;
    }

    if method == Method::OPTIONS {
        return Some(cors_preflight());
    }

    let response = match (&method, path.as_str()) {
        (&Method::GET, p) if p.starts_with("/api/upload/video/") => {
            let tail = p.strip_prefix("/api/upload/video/").unwrap_or("");
            match tail.split_once('/') {
                Some((course_id, lesson_id)) if !course_id.is_empty() && !lesson_id.is_empty() => {
                    handle_playback_url(req, state, course_id, lesson_id).await
                }
                _ => Err(LearngateError::NotFound(format!("No route for {}", path))),
            }
        }
        (&Method::POST, "/api/upload/signature/video") => handle_video_signature(req, state).await,
        (&Method::POST, "/api/upload/signature/image") => handle_image_signature(req, state).await,
        _ => Err(LearngateError::NotFound(format!("No route for {}", path))),
    };

    Some(response.unwrap_or_else(error_response))
}
