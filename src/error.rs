use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("Discovery failed: {0}")]
    Discovery(String),

    #[error("Discovery timed out: no valid Freebox found")]
    DiscoveryTimeout,

    #[error("API version error: {0}")]
    Version(String),

    #[error("Freebox API error: auth_required")]
    AuthRequired,

    #[error("Freebox API error: invalid_token")]
    InvalidToken,

    #[error("Session rejected by Freebox after refresh: {0}")]
    SessionRejected(String),

    #[error("Freebox API error on {method} {url}: {code}: {message}")]
    Api {
        method: String,
        url: String,
        code: String,
        message: String,
    },

    #[error("Authorization {0}: approve the exporter on the Freebox front panel and restart")]
    AuthorizationDenied(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("mDNS error: {0}")]
    Mdns(String),
}

impl ExporterError {
    /// True for the two envelope codes that a session refresh can recover from.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::AuthRequired | Self::InvalidToken)
    }

    /// Process exit code for a fatal startup error.
    ///
    /// `2` means the operator has something to fix locally (settings,
    /// credentials file, API version or pairing). `1` means the Freebox or
    /// the network misbehaved.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_)
            | Self::Version(_)
            | Self::Io(_)
            | Self::AuthorizationDenied(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExporterError>;
