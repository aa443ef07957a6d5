//! SL client error types.

/// Errors from talking to the SL API, before its own status code is read.
#[derive(Debug, thiserror::Error)]
pub enum SlError {
    /// HTTP request failed (network error, timeout, proxy, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success HTTP status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body was not the expected JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// No data for this site (mock client only)
    #[error("no departures available for site {0}")]
    UnknownSite(String),

    /// Mock data could not be loaded
    #[error("mock data error: {0}")]
    MockData(String),
}
