//! Error types for the healthnav-core library.

use thiserror::Error;

/// Main error type for the healthnav library.
#[derive(Error, Debug)]
pub enum HealthnavError {
    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Conversational assistant error.
    #[error("assistant error: {0}")]
    Assistant(#[from] AssistantError),

    /// Profile or report storage error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Questionnaire/profile validation error.
    #[error("profile error: {0}")]
    Profile(#[from] ProfileError),

    /// Image decoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by an OCR engine.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Failures of the conversational assistant.
///
/// Every variant maps to a distinct caller-displayable message through
/// [`AssistantError::user_message`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssistantError {
    /// No API key was configured.
    #[error("API key is not configured")]
    MissingApiKey,

    /// The service rejected the API key.
    #[error("API key not valid")]
    InvalidApiKey,

    /// The API key has expired.
    #[error("API key expired")]
    ApiKeyExpired,

    /// The key is not allowed to call the service.
    #[error("API key is blocked for this service")]
    ServiceBlocked,

    /// The configured model does not exist or is unavailable in the region.
    #[error("model not found: {model}")]
    ModelNotFound { model: String },

    /// Too many requests.
    #[error("rate limit exceeded")]
    RateLimited,

    /// The prompt or the reply was blocked by safety filters.
    #[error("blocked by safety settings: {reason}")]
    SafetyBlocked { reason: String },

    /// The reply did not contain any text.
    #[error("unexpected response format")]
    UnexpectedResponse,

    /// Any other API failure.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Transport failure (DNS, TLS, timeout, ...).
    #[error("network error: {0}")]
    Network(String),
}

/// Errors related to the profile/report store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The user id contains characters that cannot be used as a key.
    #[error("invalid user id: {0:?}")]
    InvalidUser(String),

    /// No report with this id exists for the user.
    #[error("report not found: {0}")]
    ReportNotFound(String),
}

/// Errors raised when validating questionnaire answers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// Consent was not given.
    #[error("consent is required to save a profile")]
    ConsentRequired,

    /// A select answer is not one of the allowed options.
    #[error("invalid value for {field}: {value:?}")]
    InvalidOption { field: String, value: String },
}

/// Result type for the healthnav library.
pub type Result<T> = std::result::Result<T, HealthnavError>;
