//! Error types for the Surtidor client library.

/// Convenient result alias for fallible Surtidor operations.
pub type Result<T> = core::result::Result<T, SurtidorError>;

/// All errors that can occur when using the Surtidor client.
#[derive(Debug, thiserror::Error)]
pub enum SurtidorError {
    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP transport failed (connection refused, timeout, TLS, ...).
    #[cfg(any(feature = "async", feature = "blocking"))]
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The data service rejected the request.
    ///
    /// Carries the backend's message verbatim so it can be surfaced to
    /// the user unchanged.
    #[error("data service error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the data service.
        status: u16,
        /// Human-readable message from the data service.
        message: String,
    },

    /// A pending error report already exists for the target discount.
    #[error("a pending report already exists for this discount")]
    DuplicateReport,

    /// A draft failed local validation; no network traffic occurred.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A submission was attempted while its cooldown is still active.
    #[error("please wait {remaining_secs}s before submitting again")]
    Cooldown {
        /// Whole seconds left until the cooldown expires (rounded up).
        remaining_secs: u64,
    },

    /// Cooldown storage backend failed.
    #[error("storage error: {0}")]
    Storage(Box<dyn core::error::Error + Send + Sync>),

    /// No API key was provided when building the client.
    #[error("an API key is required to reach the data service")]
    MissingApiKey,

    /// No base URL was provided when building the client.
    #[error("a base URL is required to reach the data service")]
    MissingBaseUrl,
}

/// Local validation failures raised before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required field was left empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The discount percentage is outside `[0, 100]`.
    #[error("discount percentage must be between 0 and 100, got {0}")]
    PercentageOutOfRange(u32),

    /// The reimbursement limit exceeds the application-defined maximum.
    #[error("reimbursement limit {value} exceeds the maximum of {max}")]
    ReimbursementTooLarge {
        /// The rejected limit value.
        value: u64,
        /// The application-defined maximum.
        max: u32,
    },

    /// An error report selected neither a field error nor discontinued.
    #[error("select at least one error type or mark the discount as discontinued")]
    NoErrorSelected,

    /// The evidence URL did not parse even after prefixing `https://`.
    #[error("evidence URL is not a valid URL: {0}")]
    InvalidEvidenceUrl(String),
}
