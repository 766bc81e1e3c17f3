//! Error types for arch-app-meta

/// Resolution and cache errors.
#[derive(Debug, thiserror::Error)]
pub enum MetaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
