//! Error types for the fleet bot.

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// The database file or connection could not be opened.
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    /// Unique constraint on `plate_number` rejected the insert.
    #[error("Vehicle with plate {plate} already exists")]
    DuplicateKey { plate: String },

    #[error("Invalid {field}: {message}")]
    InvalidField { field: String, message: String },
}

impl DatabaseError {
    /// Whether the error means the storage layer itself is unreachable or broken.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Pool(_) | Self::Migration(_))
    }
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Failed to send response on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Failures surfaced by the registration dialog.
///
/// Validation failures on the plate step are handled inside the dialog and
/// re-prompt; everything that reaches this type after the store call is
/// terminal for the dialog instance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("{0}")]
    Validation(String),

    #[error("Vehicle with plate {plate} already exists")]
    DuplicateKey { plate: String },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl From<DatabaseError> for RegistrationError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::DuplicateKey { plate } => Self::DuplicateKey { plate },
            DatabaseError::InvalidField { field, message } => {
                Self::Validation(format!("invalid {field}: {message}"))
            }
            other => Self::StorageUnavailable(other.to_string()),
        }
    }
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
