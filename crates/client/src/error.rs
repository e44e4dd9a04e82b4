/// Errors from the Shipyard API client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// The `error` field of the response body, or the raw body.
        message: String,
    },

    /// The configured base URL cannot be turned into a request URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The operation was stopped through its cancellation token.
    #[error("cancelled")]
    Cancelled,
}

impl ClientError {
    /// `true` for a 404 answer.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}
