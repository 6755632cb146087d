use thiserror::Error;

/// Failures talking to the external terminology service.
#[derive(Debug, Error)]
pub enum TerminologyError {
    #[error("terminology client credentials are not configured")]
    MissingCredentials,

    #[error("token request failed: {0}")]
    TokenRequest(#[source] reqwest::Error),

    #[error("token endpoint returned {status}: {body}")]
    TokenRejected { status: u16, body: String },

    #[error("search request failed: {0}")]
    SearchRequest(#[source] reqwest::Error),

    #[error("search endpoint returned {status}: {body}")]
    SearchRejected { status: u16, body: String },

    #[error("terminology service did not answer within {secs}s")]
    Timeout { secs: u64 },

    #[error("invalid response from terminology service: {reason}")]
    InvalidResponse { reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
