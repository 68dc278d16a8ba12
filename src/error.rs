//! Error types for operations that can be rejected.
//!
//! Only configuration and content loading report errors. Everything else in
//! the window lifecycle is a no-op that logs and returns.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PopupError {
    #[error("The url is not defined")]
    MissingUrl,
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },
    #[error("invalid template: {0}")]
    Template(#[from] serde_json::Error),
    #[error("template `{0}` not found")]
    TemplateNotFound(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
