use thiserror::Error;

/// Everything that can go wrong during a single load attempt.
///
/// Errors are terminal for that attempt; nothing is retried automatically.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Image url is missing or malformed")]
    BadUrl,
    #[error("Failed to fetch image: {0:#}")]
    Transport(anyhow::Error),
    #[error("Failed to decode image: {0:#}")]
    Decode(anyhow::Error),
}

impl LoadError {
    pub fn is_bad_url(&self) -> bool {
        matches!(self, LoadError::BadUrl)
    }
    pub fn is_transport(&self) -> bool {
        matches!(self, LoadError::Transport(_))
    }
    pub fn is_decode(&self) -> bool {
        matches!(self, LoadError::Decode(_))
    }
}
