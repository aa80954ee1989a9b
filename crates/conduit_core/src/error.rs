use thiserror::Error;

/// Failures of the shell's own plumbing. Page-level failures are rendered, never returned.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("session persistence failed: {0}")]
    Persistence(String),
    #[error("failed to decode JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("inconsistent fixture data: {0}")]
    Fixture(String),
}
