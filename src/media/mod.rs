//! Media delivery adapter
//!
//! External collaborator boundary for the video CDN. The core only ever
//! asks for two things: a time-boxed signed playback URL for a stored
//! media reference, and an upload signature that lets the SPA upload
//! directly to the CDN without ever seeing the API secret. Failures are
//! surfaced as generic delivery errors; the core neither retries nor
//! interprets them.

use async_trait::async_trait;
use base64::Engine;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

use crate::config::CdnArgs;
use crate::types::{LearngateError, Result};

/// Resource kind for upload signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    Video,
}

impl UploadKind {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

/// Signature payload handed to the SPA for a direct CDN upload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSignature {
    pub timestamp: u64,
    pub signature: String,
    pub folder: String,
    pub api_key: String,
    pub cloud_name: String,
    /// HLS eager transformation, set for video uploads only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eager: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eager_async: Option<String>,
}

/// Contract the core consumes; the CDN specifics live behind it
#[async_trait]
pub trait MediaDelivery: Send + Sync {
    /// Time-boxed signed playback URL for a stored media reference
    async fn signed_playback_url(&self, media_id: &str, ttl: Duration) -> Result<String>;

    /// Signature for a direct client upload into the given folder
    fn upload_signature(&self, folder: &str, kind: UploadKind) -> Result<UploadSignature>;
}

/// Cloudinary-style delivery adapter
pub struct CloudinaryDelivery {
    cfg: CdnArgs,
}

impl CloudinaryDelivery {
    pub fn new(cfg: CdnArgs) -> Self {
        Self { cfg }
    }

    fn unix_now() -> Result<u64> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .map_err(|e| LearngateError::Delivery(format!("System time error: {}", e)))
    }

    /// URL-safe signature token over the signed portion of a delivery URL
    fn url_signature(&self, signed_part: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(signed_part.as_bytes());
        hasher.update(self.cfg.api_secret.as_bytes());
        let digest = hasher.finalize();
        let token = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(digest);
        token[..8].to_string()
    }

    /// Hex signature over sorted request parameters, for upload signing
    fn param_signature(&self, params: &[(&str, String)]) -> String {
        let mut sorted: Vec<&(&str, String)> = params.iter().collect();
        sorted.sort_by_key(|(k, _)| *k);

        let to_sign: Vec<String> = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();

        let mut hasher = Sha256::new();
        hasher.update(to_sign.join("&").as_bytes());
        hasher.update(self.cfg.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl MediaDelivery for CloudinaryDelivery {
    /// Build an HLS playback URL whose signed portion binds the media id to
    /// an absolute expiry timestamp.
    async fn signed_playback_url(&self, media_id: &str, ttl: Duration) -> Result<String> {
        if self.cfg.api_secret.is_empty() {
            return Err(LearngateError::Delivery(
                "CDN API secret is not configured".into(),
            ));
        }

        let expires_at = Self::unix_now()? + ttl.as_secs();
        let transformation = format!("sp_auto,e_{}", expires_at);
        let signed_part = format!("{}/{}", transformation, media_id);
        let signature = self.url_signature(&signed_part);

        let url = format!(
            "https://res.cloudinary.com/{}/video/upload/s--{}--/{}/{}.m3u8",
            self.cfg.cloud_name,
            signature,
            transformation,
            urlencoding::encode(media_id),
        );

        debug!("Signed playback URL for {} (expires {})", media_id, expires_at);
        Ok(url)
    }

    fn upload_signature(&self, folder: &str, kind: UploadKind) -> Result<UploadSignature> {
        if self.cfg.api_secret.is_empty() {
            return Err(LearngateError::Delivery(
                "CDN API secret is not configured".into(),
            ));
        }

        let timestamp = Self::unix_now()?;
        let mut params: Vec<(&str, String)> = vec![
            ("folder", folder.to_string()),
            ("timestamp", timestamp.to_string()),
        ];

        // Videos get an eager HLS transformation so playback is ready
        // as soon as the upload finishes
        let (eager, eager_async) = if kind == UploadKind::Video {
            let eager = "sp_auto/m3u8".to_string();
            params.push(("eager", eager.clone()));
            params.push(("eager_async", "true".to_string()));
            params.push(("resource_type", kind.as_str().to_string()));
            (Some(eager), Some("true".to_string()))
        } else {
            (None, None)
        };

        let signature = self.param_signature(&params);

        Ok(UploadSignature {
            timestamp,
            signature,
            folder: folder.to_string(),
            api_key: self.cfg.api_key.clone(),
            cloud_name: self.cfg.cloud_name.clone(),
            eager,
            eager_async,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> CloudinaryDelivery {
        CloudinaryDelivery::new(CdnArgs {
            cloud_name: "test-cloud".into(),
            api_key: "key-123".into(),
            api_secret: "secret-456".into(),
            signed_url_ttl_seconds: 3600,
        })
    }

    #[tokio::test]
    async fn test_playback_url_shape() {
        let url = adapter()
            .signed_playback_url("e-learning/videos/lesson-1", Duration::from_secs(3600))
            .await
            .unwrap();

        assert!(url.starts_with("https://res.cloudinary.com/test-cloud/video/upload/s--"));
        assert!(url.ends_with(".m3u8"));
        assert!(url.contains("sp_auto,e_"));
    }

    #[tokio::test]
    async fn test_playback_url_requires_secret() {
        let adapter = CloudinaryDelivery::new(CdnArgs {
            cloud_name: "test-cloud".into(),
            api_key: "key".into(),
            api_secret: String::new(),
            signed_url_ttl_seconds: 3600,
        });

        let err = adapter
            .signed_playback_url("vid", Duration::from_secs(60))
            .await
            .unwrap_err();
        assert!(matches!(err, LearngateError::Delivery(_)));
    }

    #[tokio::test]
    async fn test_different_media_different_signature() {
        let adapter = adapter();
        let a = adapter
            .signed_playback_url("video-a", Duration::from_secs(3600))
            .await
            .unwrap();
        let b = adapter
            .signed_playback_url("video-b", Duration::from_secs(3600))
            .await
            .unwrap();

        let sig = |url: &str| {
            let start = url.find("s--").unwrap() + 3;
            url[start..start + 8].to_string()
        };
        assert_ne!(sig(&a), sig(&b));
    }

    #[test]
    fn test_video_upload_signature_includes_eager() {
        let sig = adapter()
            .upload_signature("e-learning/videos", UploadKind::Video)
            .unwrap();

        assert_eq!(sig.cloud_name, "test-cloud");
        assert_eq!(sig.api_key, "key-123");
        assert_eq!(sig.eager.as_deref(), Some("sp_auto/m3u8"));
        assert_eq!(sig.eager_async.as_deref(), Some("true"));
        assert_eq!(sig.signature.len(), 64); // sha256 hex
    }

    #[test]
    fn test_image_upload_signature_has_no_eager() {
        let sig = adapter()
            .upload_signature("e-learning/images", UploadKind::Image)
            .unwrap();
        assert!(sig.eager.is_none());
        assert!(sig.eager_async.is_none());
    }

    #[test]
    fn test_param_signature_is_order_independent() {
        let adapter = adapter();
        let a = adapter.param_signature(&[
            ("folder", "f".into()),
            ("timestamp", "1".into()),
        ]);
        let b = adapter.param_signature(&[
            ("timestamp", "1".into()),
            ("folder", "f".into()),
        ]);
        assert_eq!(a, b);
    }
}
