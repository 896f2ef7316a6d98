//! Common error types for reftag

use thiserror::Error;

/// Common result type for reftag operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types surfaced by the tagging core and its collaborators
#[derive(Error, Debug)]
pub enum Error {
    /// A host collaborator (environment reader, session storage, emitter) failed
    #[error("Collaborator failure: {0}")]
    Collaborator(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for a collaborator failure with a formatted message
    pub fn collaborator(msg: impl Into<String>) -> Self {
        Error::Collaborator(msg.into())
    }
}
