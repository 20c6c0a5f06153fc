//! Error taxonomy for control-plane operations
//!
//! Every public operation in the workspace returns [`ArmadaError`]. The
//! variants mirror how the dispatcher classifies control-plane responses, so
//! callers can branch on the class (`is_not_found`, `is_conflict`, ...) after
//! any amount of message wrapping.

/// Classified error for all Armada operations
#[derive(Debug, thiserror::Error)]
pub enum ArmadaError {
    /// Resource or lease absent; sometimes transient during eventual
    /// consistency windows, hence retried by the lister only
    #[error("not found: {message}")]
    NotFound {
        /// What was missing
        message: String,
    },

    /// Another holder's lease is active on the machine
    #[error("conflict: {message}")]
    Conflict {
        /// Description of the conflicting claim
        message: String,
    },

    /// Stale or wrong lease nonce
    #[error("forbidden: {message}")]
    Forbidden {
        /// Description of the rejected credential
        message: String,
    },

    /// Transport failure or control-plane 5xx
    #[error("unavailable: {message}")]
    Unavailable {
        /// Description of the transport or server failure
        message: String,
    },

    /// Client-side malformed input, e.g. an unknown action
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// What was malformed
        message: String,
    },

    /// Internal error that fits no other class
    #[error("internal error: {message}")]
    Internal {
        /// Error description
        message: String,
    },

    /// A retried operation exhausted its backoff budget; the final attempt's
    /// error is chained so classification survives the marker
    #[error("{message} even after retries: {source}")]
    RetriesExhausted {
        /// The operation that ran out of budget
        message: String,
        /// Error from the final attempt
        #[source]
        source: Box<ArmadaError>,
    },
}

impl ArmadaError {
    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a lease conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Create an unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Mark an error as having survived a full retry budget
    pub fn retries_exhausted(message: impl Into<String>, source: ArmadaError) -> Self {
        Self::RetriesExhausted {
            message: message.into(),
            source: Box::new(source),
        }
    }

    /// Prefix the message with the failing operation while keeping the
    /// classification, so `is_not_found` and friends still answer correctly
    /// after wrapping
    #[must_use]
    pub fn context(self, context: impl std::fmt::Display) -> Self {
        match self {
            Self::NotFound { message } => Self::NotFound {
                message: format!("{context}: {message}"),
            },
            Self::Conflict { message } => Self::Conflict {
                message: format!("{context}: {message}"),
            },
            Self::Forbidden { message } => Self::Forbidden {
                message: format!("{context}: {message}"),
            },
            Self::Unavailable { message } => Self::Unavailable {
                message: format!("{context}: {message}"),
            },
            Self::InvalidRequest { message } => Self::InvalidRequest {
                message: format!("{context}: {message}"),
            },
            Self::Internal { message } => Self::Internal {
                message: format!("{context}: {message}"),
            },
            Self::RetriesExhausted { message, source } => Self::RetriesExhausted {
                message: format!("{context}: {message}"),
                source,
            },
        }
    }

    /// True for `NotFound`, looking through a `RetriesExhausted` marker
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::RetriesExhausted { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// True for a lease conflict
    pub fn is_conflict(&self) -> bool {
        match self {
            Self::Conflict { .. } => true,
            Self::RetriesExhausted { source, .. } => source.is_conflict(),
            _ => false,
        }
    }

    /// True for a stale or wrong nonce rejection
    pub fn is_forbidden(&self) -> bool {
        match self {
            Self::Forbidden { .. } => true,
            Self::RetriesExhausted { source, .. } => source.is_forbidden(),
            _ => false,
        }
    }

    /// True for transport or server failures
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Unavailable { .. } => true,
            Self::RetriesExhausted { source, .. } => source.is_unavailable(),
            _ => false,
        }
    }

    /// True when a retry budget was exhausted
    pub const fn is_retries_exhausted(&self) -> bool {
        matches!(self, Self::RetriesExhausted { .. })
    }
}

/// Standard Result type for Armada operations
pub type Result<T> = std::result::Result<T, ArmadaError>;
