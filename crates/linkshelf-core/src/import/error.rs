//! Import source errors

use reqwest::StatusCode;
use thiserror::Error;

/// Why an import source could not produce its records
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("{provider}: missing {what}")]
    MissingCredentials {
        provider: &'static str,
        what: &'static str,
    },

    #[error("{provider}: {message}")]
    Unauthorized {
        provider: &'static str,
        message: &'static str,
    },

    #[error("{provider}: rate limit exceeded, try again later")]
    RateLimited { provider: &'static str },

    #[error("{provider}: not found (HTTP 404)")]
    NotFound { provider: &'static str },

    #[error("{provider}: API error (HTTP {status})")]
    Status {
        provider: &'static str,
        status: u16,
    },

    #[error("{provider}: unexpected response: {source}")]
    Decode {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider}: network error: {source}")]
    Network {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl ImportError {
    /// Map a non-success HTTP status
    pub fn from_status(provider: &'static str, status: StatusCode, auth_message: &'static str) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => ImportError::Unauthorized {
                provider,
                message: auth_message,
            },
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
                ImportError::RateLimited { provider }
            }
            StatusCode::NOT_FOUND => ImportError::NotFound { provider },
            other => ImportError::Status {
                provider,
                status: other.as_u16(),
            },
        }
    }

    /// Classify a transport or body error
    pub fn from_reqwest(provider: &'static str, source: reqwest::Error) -> Self {
        if source.is_decode() {
            ImportError::Decode { provider, source }
        } else {
            ImportError::Network { provider, source }
        }
    }

    /// Whether retrying later could succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ImportError::RateLimited { .. } | ImportError::Network { .. }
        ) || matches!(self, ImportError::Status { status, .. } if *status >= 500)
    }
}
