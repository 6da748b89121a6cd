use thiserror::Error;

/// Every failure the crate can report, from storage errors to rejected requests.
#[derive(Debug, Error)]
pub enum Error {
    /// Settings or the seed file could not be loaded.
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong with the configuration
        message: String,
    },

    /// Query or connection failure from SeaORM.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem or socket failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No credential was presented at all.
    #[error("Authentication token missing")]
    Unauthenticated,

    /// Unknown username or wrong password at login.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// A credential was presented but is invalid, expired, or lacks the required role.
    #[error("Forbidden: {reason}")]
    Forbidden {
        /// Why access was refused
        reason: String,
    },

    /// Malformed or incomplete input.
    #[error("Validation failed: {message}")]
    Validation {
        /// Human-readable description of the problem
        message: String,
    },

    /// A negative or non-finite price.
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected value
        amount: f64,
    },

    /// No row with the given id.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity name, e.g. `"Owner"`
        entity: &'static str,
        /// The id that was looked up
        id: String,
    },

    /// The write would break a uniqueness rule or orphan dependent rows.
    #[error("Conflict: {message}")]
    Conflict {
        /// What the write collided with
        message: String,
    },

    /// Signing a token failed.
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// bcrypt could not hash or parse a password hash.
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// A blocking task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
