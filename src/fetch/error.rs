use thiserror::Error;

/// Why a single request to the board endpoint produced no usable response.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint returned status {status}")]
    Status { status: u16 },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
