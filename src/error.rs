//! Error types for the lead wizard.

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Persistence errors, shared by every `LeadStore` backend.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Remote store request failed: {0}")]
    Remote(String),

    #[error("Remote store returned {status}: {body}")]
    RemoteStatus { status: u16, body: String },
}

/// Anonymous sign-in errors.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Identity provider {provider} unavailable: {reason}")]
    Unavailable { provider: String, reason: String },
}

/// Wizard transition errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("Operation {operation} is not allowed at step {step}")]
    WrongStep { operation: String, step: String },

    #[error("Unknown employee bucket: {0}")]
    UnknownBucket(String),
}

/// Lead submission errors.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("No session identity yet")]
    IdentityUnavailable,

    #[error("A submission is already in progress")]
    InProgress,

    #[error("Lead already submitted for this session")]
    AlreadySubmitted,

    #[error("Submission is only possible from the result step (currently {step})")]
    NotAtResultStep { step: String },

    #[error("Missing required contact fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<&'static str> },

    #[error("Session was reset while the submission was in flight")]
    Superseded,

    #[error("Store write failed: {0}")]
    Store(#[from] DatabaseError),
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
