//! Process configuration.
//!
//! Everything mutable-at-startup lives here as one immutable struct parsed
//! once in `main` (CLI flags or environment) and passed down to the
//! components that need it — nothing reads the environment ad hoc.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// FinTrack API server configuration.
#[derive(Parser, Debug, Clone)]
#[command(name = "fintrack-api")]
#[command(about = "Personal finance tracking REST API")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:5000")]
    pub listen: SocketAddr,

    /// Secret for signing session tokens
    #[arg(long, env = "JWT_SECRET", default_value = "dev-secret")]
    pub jwt_secret: String,

    /// Google OAuth client id; when unset, google-login audience checks are
    /// skipped (dev only)
    #[arg(long, env = "GOOGLE_CLIENT_ID")]
    pub google_client_id: Option<String>,

    /// Allowed CORS origin (the SPA)
    #[arg(long, env = "FRONTEND_URL", default_value = "http://localhost:3000")]
    pub frontend_origin: String,

    /// Base URL clients use to reach this server (for upload URLs)
    #[arg(long, env = "PUBLIC_BASE_URL", default_value = "http://localhost:5000")]
    pub public_base_url: String,

    /// Directory where uploaded profile images are written
    #[arg(long, env = "UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    /// Use the MongoDB stores instead of in-memory (requires the `mongo`
    /// build feature)
    #[arg(long, env = "USE_PERSISTENT_STORES", default_value = "false")]
    pub use_persistent_stores: bool,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "fintrack")]
    pub mongodb_db: String,

    /// Log level fallback when RUST_LOG is unset
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Whether the secret is still the insecure compiled-in default.
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == "dev-secret"
    }
}
