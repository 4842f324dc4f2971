use thiserror::Error;

pub type Result<T> = std::result::Result<T, ElectionError>;

/// Reasons an election operation can be rejected.
/// A rejected operation never leaves a partial mutation behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElectionError {
    /// Malformed input: empty name, bad timestamp ordering, duplicate name.
    #[error("Invalid input: {0}")]
    Validation(String),
    /// Operation invoked in the wrong phase or mode.
    #[error("Not allowed now: {0}")]
    State(String),
    /// Caller lacks the required role or eligibility.
    #[error("Unauthorized: {0}")]
    Authorization(String),
    /// Duplicate vote, commitment, registration or candidacy.
    #[error("Already done: {0}")]
    AlreadyDone(String),
    #[error("Not found: {0}")]
    NotFound(String),
    /// A revealed ballot did not match its commitment.
    #[error("Integrity check failed: {0}")]
    Integrity(String),
}

impl ElectionError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Authorization(msg.into())
    }

    pub fn already_done(msg: impl Into<String>) -> Self {
        Self::AlreadyDone(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::Integrity(msg.into())
    }
}
