//! Timber's error type and how each failure is presented to API clients
//!
//! Handlers, repositories and the upload workflow all return [`AppError`].
//! The HTTP layer never matches on variants itself; it asks [`ErrorMetadata`]
//! for the status, the stable `code` clients switch on, whether the request is
//! worth retrying and what the user can do next. Upstream failures from OpenAI,
//! Stripe and Postgres are marked sensitive so their raw text stays in the logs.
//!
//! With the `sqlx` feature off, `Database` carries a plain message.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Caller mistakes: bad input, unknown ids, failed auth
    Debug,
    /// A feature is switched off or an upstream is briefly unavailable
    Warn,
    /// Something broke on our side or at a provider
    Error,
}

/// How an error shows up in an API response and in the logs
pub trait ErrorMetadata {
    fn http_status_code(&self) -> u16;

    /// Stable identifier such as `STRIPE_ERROR`; the frontend branches on it
    fn error_code(&self) -> &'static str;

    /// Retrying the same request later may succeed
    fn is_recoverable(&self) -> bool;

    /// Next step shown to the user, if there is a useful one
    fn suggested_action(&self) -> Option<&'static str>;

    fn client_message(&self) -> String;

    /// Hide the underlying message outside development
    fn is_sensitive(&self) -> bool;

    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("AI service error: {0}")]
    AiService(String),

    #[error("Stripe error: {0}")]
    StripeError(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("UUID parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

struct Presentation {
    status: u16,
    code: &'static str,
    recoverable: bool,
    action: Option<&'static str>,
    sensitive: bool,
    level: LogLevel,
}

impl AppError {
    fn presentation(&self) -> Presentation {
        let (status, code, recoverable, action, sensitive, level) = match self {
            AppError::Database(_) => (
                500,
                "DATABASE_ERROR",
                true,
                Some("Your data is safe. Try again in a moment"),
                true,
                LogLevel::Error,
            ),
            AppError::InvalidInput(_) => (
                400,
                "INVALID_INPUT",
                false,
                Some("Check the amounts and fields you entered"),
                false,
                LogLevel::Debug,
            ),
            AppError::BadRequest(_) => (
                400,
                "BAD_REQUEST",
                false,
                Some("Adjust the request as described in the error message"),
                false,
                LogLevel::Debug,
            ),
            AppError::NotFound(_) => (
                404,
                "NOT_FOUND",
                false,
                Some("The record may have been deleted; refresh your list"),
                false,
                LogLevel::Debug,
            ),
            AppError::PayloadTooLarge(_) => (
                413,
                "PAYLOAD_TOO_LARGE",
                false,
                Some("Upload a smaller statement or split it into several files"),
                false,
                LogLevel::Debug,
            ),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => (
                500,
                "INTERNAL_ERROR",
                true,
                Some("Try again in a moment"),
                true,
                LogLevel::Error,
            ),
            AppError::Unauthorized(_) => (
                401,
                "UNAUTHORIZED",
                false,
                Some("Sign in again to continue"),
                false,
                LogLevel::Debug,
            ),
            AppError::AiService(_) => (
                500,
                "AI_SERVICE_ERROR",
                true,
                Some("The advisor is busy. Ask again in a moment"),
                true,
                LogLevel::Error,
            ),
            AppError::StripeError(_) => (
                500,
                "STRIPE_ERROR",
                true,
                Some("Billing could not be reached. Try again shortly"),
                true,
                LogLevel::Error,
            ),
            AppError::ServiceUnavailable(_) => (
                503,
                "SERVICE_UNAVAILABLE",
                true,
                Some("This feature is switched off on this server"),
                false,
                LogLevel::Warn,
            ),
        };

        Presentation {
            status,
            code,
            recoverable,
            action,
            sensitive,
            level,
        }
    }

    /// Variant name, shown in development error bodies
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::BadRequest(_) => "BadRequest",
            AppError::NotFound(_) => "NotFound",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::AiService(_) => "AiService",
            AppError::StripeError(_) => "StripeError",
            AppError::ServiceUnavailable(_) => "ServiceUnavailable",
        }
    }

    /// Message plus up to five `Caused by` lines from the source chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        self.presentation().status
    }

    fn error_code(&self) -> &'static str {
        self.presentation().code
    }

    fn is_recoverable(&self) -> bool {
        self.presentation().recoverable
    }

    fn suggested_action(&self) -> Option<&'static str> {
        self.presentation().action
    }

    fn is_sensitive(&self) -> bool {
        self.presentation().sensitive
    }

    fn log_level(&self) -> LogLevel {
        self.presentation().level
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Could not reach your financial records".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::AiService(_) => "The Timber advisor could not answer right now".to_string(),
            AppError::StripeError(_) => "Billing is temporarily unavailable".to_string(),
            AppError::ServiceUnavailable(ref msg) => msg.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_database() {
        #[cfg(feature = "sqlx")]
        let err = AppError::from(sqlx::Error::PoolClosed);
        #[cfg(not(feature = "sqlx"))]
        let err = AppError::Database("pool closed".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Could not reach your financial records");
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_not_found() {
        let err = AppError::NotFound("Document not found".to_string());
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "Document not found");
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_stripe_hides_upstream_message() {
        let err = AppError::StripeError("No such price: 'price_123'".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.client_message(), "Billing is temporarily unavailable");
        assert!(err.is_sensitive());
    }

    #[test]
    fn test_error_metadata_service_unavailable() {
        let err = AppError::ServiceUnavailable("AI advisor is not configured".to_string());
        assert_eq!(err.http_status_code(), 503);
        assert_eq!(err.error_code(), "SERVICE_UNAVAILABLE");
        assert!(err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_suggested_actions_speak_to_the_user() {
        let expired = AppError::Unauthorized("token expired".to_string());
        assert_eq!(expired.suggested_action(), Some("Sign in again to continue"));

        let oversized = AppError::PayloadTooLarge("25 MB".to_string());
        assert_eq!(oversized.http_status_code(), 413);
        assert_eq!(
            oversized.suggested_action(),
            Some("Upload a smaller statement or split it into several files")
        );

        let checkout = AppError::StripeError("card_declined".to_string());
        assert_eq!(
            checkout.suggested_action(),
            Some("Billing could not be reached. Try again shortly")
        );
        assert!(checkout.is_recoverable());
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let err = AppError::from(anyhow::anyhow!("inner failure").context("outer context"));
        let details = err.detailed_message();
        assert!(details.contains("Internal error with source"));
        assert!(details.contains("outer context"));
    }
}
