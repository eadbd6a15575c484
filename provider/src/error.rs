use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Request(String),

    #[error("provider unreachable: {0}")]
    Unreachable(String),

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response from provider: {0}")]
    InvalidResponse(String),

    #[error("provider response is missing {0}")]
    MissingField(String),

    #[error("unsupported provider value: {0}")]
    Unsupported(String),

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Unreachable(format!("request timed out: {e}"))
        } else if e.is_connect() {
            Self::Unreachable(format!("connection failed: {e}"))
        } else {
            Self::Request(e.to_string())
        }
    }
}
