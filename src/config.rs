//! Configuration for LearnGate
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;

/// LearnGate - REST API for the e-learning marketplace
#[derive(Parser, Debug, Clone)]
#[command(name = "learngate")]
#[command(about = "REST API for the LearnGate e-learning marketplace")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "learngate")]
    pub mongodb_db: String,

    /// JWT secret for token signing (required in production)
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// JWT access token expiry in seconds
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value = "3600")]
    pub jwt_expiry_seconds: u64,

    /// Enable development mode (insecure default JWT secret)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Allowed CORS origin for the SPA client
    #[arg(long, env = "CLIENT_URL", default_value = "http://localhost:5173")]
    pub client_url: String,

    /// Media CDN configuration
    #[command(flatten)]
    pub cdn: CdnArgs,
}

/// Media CDN (Cloudinary-style) configuration
#[derive(Parser, Debug, Clone)]
pub struct CdnArgs {
    /// CDN cloud name (account identifier)
    #[arg(long, env = "CDN_CLOUD_NAME", default_value = "learngate-dev")]
    pub cloud_name: String,

    /// CDN API key, sent to the client alongside upload signatures
    #[arg(long, env = "CDN_API_KEY", default_value = "")]
    pub api_key: String,

    /// CDN API secret used to sign playback URLs and upload requests
    #[arg(long, env = "CDN_API_SECRET", default_value = "")]
    pub api_secret: String,

    /// Validity window for signed playback URLs, in seconds
    #[arg(long, env = "CDN_SIGNED_URL_TTL", default_value = "3600")]
    pub signed_url_ttl_seconds: u64,
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode {
            if self.jwt_secret.is_none() {
                return Err("JWT_SECRET is required in production mode".to_string());
            }
            if self.cdn.api_secret.is_empty() {
                return Err("CDN_API_SECRET is required in production mode".to_string());
            }
        }

        if self.jwt_expiry_seconds == 0 {
            return Err("JWT_EXPIRY_SECONDS must be greater than zero".to_string());
        }

        if self.cdn.signed_url_ttl_seconds == 0 {
            return Err("CDN_SIGNED_URL_TTL must be greater than zero".to_string());
        }

        Ok(())
    }
}
