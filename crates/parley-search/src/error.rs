//! Error types for the search subsystem

use thiserror::Error;

/// Result type alias using the search subsystem's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Search subsystem error types
///
/// The API layer maps these onto transport-level failures: `Forbidden`
/// becomes a 403, engine errors become 503. Index-sync races (entity
/// deleted before the index call lands) are not errors at all - those
/// paths return `Ok(())`.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller requested a scoped operation outside their granted access.
    /// Never downgraded to an empty result set.
    #[error("not authorized: {0}")]
    Forbidden(String),

    /// The search engine answered with a non-success status.
    #[error("search engine error ({status}): {message}")]
    Engine { status: u16, message: String },

    /// The search engine could not be reached at all.
    #[error("search engine request failed: {0}")]
    EngineTransport(#[from] reqwest::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error should surface as an authorization failure
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }

    /// Whether this error means the search engine is unavailable or failing
    pub fn is_engine_unavailable(&self) -> bool {
        matches!(self, Self::Engine { .. } | Self::EngineTransport(_))
    }
}
