use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Faults raised by grid and cell operations.
///
/// A failing operation is rejected before it mutates anything.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The caller passed a value outside the operation's domain.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Search bookkeeping contradicts itself; a prior invariant was broken.
    #[error("inconsistent state: {message}")]
    InconsistentState { message: String },
}

impl Error {
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn inconsistent(message: impl Into<String>) -> Self {
        Self::InconsistentState {
            message: message.into(),
        }
    }
}
