/// Unified error type for the artist-style crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StyleError {
    /// Candidate extraction produced nothing to look up.
    #[error("No artists detected in prompt")]
    NoArtistsDetected,

    /// Every candidate generation failed or matched nothing.
    #[error("No artists could be generated. Check API key and artist names.")]
    NoStyleGenerated,

    /// Upstream LLM provider failure, carrying its message.
    #[error("provider error: {0}")]
    Provider(String),

    /// The style dictionary could not be fetched.
    #[error("dictionary fetch failed: {0}")]
    FetchFailed(String),

    /// Administrative operation attempted without the admin password.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias using [`StyleError`].
pub type StyleResult<T> = Result<T, StyleError>;
