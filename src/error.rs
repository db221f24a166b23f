//! Error type shared by the Horizon client, the RPC client and the views.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StellarxError {
    /// Horizon answered 404 for the requested resource.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("HTTP {status}{}", .detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    Http { status: u16, detail: Option<String> },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("rpc {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("{0}")]
    Validation(String),

    #[error("request cancelled")]
    Cancelled,
}

impl StellarxError {
    /// Text for the view's error banner.
    pub fn user_message(&self) -> String {
        match self {
            StellarxError::NotFound(_) => "Not found".to_string(),
            StellarxError::Http {
                status,
                detail: Some(d),
            } if !d.is_empty() => format!("Error {status}: {d}"),
            StellarxError::Http { status, .. } => format!("Error {status}"),
            StellarxError::Network(e) if e.is_timeout() => "Request timed out".to_string(),
            StellarxError::Network(_) => "Network error".to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StellarxError::NotFound(_))
            || matches!(self, StellarxError::Http { status: 404, .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, StellarxError::Cancelled)
    }
}

impl From<serde_json::Error> for StellarxError {
    fn from(e: serde_json::Error) -> Self {
        StellarxError::Decode(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StellarxError>;
