// HTTP-facing page errors
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse},
};

use crate::database::DatabaseError;
use crate::pages::html::escape_html;
use crate::session::SessionError;

/// Page error with status code and a client-safe message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl PageError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            PageError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            PageError::Forbidden(_) => StatusCode::FORBIDDEN,
            PageError::NotFound(_) => StatusCode::NOT_FOUND,
            PageError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PageError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            PageError::Unauthorized(msg) => msg,
            PageError::Forbidden(msg) => msg,
            PageError::NotFound(msg) => msg,
            PageError::InternalServerError(msg) => msg,
            PageError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            PageError::Unauthorized(_) => "UNAUTHORIZED",
            PageError::Forbidden(_) => "FORBIDDEN",
            PageError::NotFound(_) => "NOT_FOUND",
            PageError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            PageError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Notice rendered in the body slot between header and footer
    pub fn to_notice_html(&self) -> String {
        format!(
            "<div class=\"error\" data-code=\"{}\"><p>{}</p></div>\n",
            self.error_code(),
            escape_html(self.message())
        )
    }

    /// Standalone document for failures outside the page chrome
    pub fn to_document_html(&self) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head><title>SchoolMate - {}</title></head>\n<body>\n{}</body>\n</html>\n",
            self.status_code().as_u16(),
            self.to_notice_html()
        )
    }
}

// Static constructor methods
impl PageError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        PageError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        PageError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        PageError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        PageError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        PageError::ServiceUnavailable(message.into())
    }
}

impl From<DatabaseError> for PageError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::ConfigMissing(what) => {
                tracing::error!("Database configuration missing: {}", what);
                PageError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::InvalidDatabaseUrl => {
                tracing::error!("Database URL is invalid");
                PageError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::QueryError(msg) => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Database query error: {}", msg);
                PageError::internal_server_error("An error occurred while processing your request")
            }
            DatabaseError::Sqlx(sqlx::Error::PoolTimedOut) | DatabaseError::Sqlx(sqlx::Error::PoolClosed) => {
                tracing::error!("Database pool unavailable");
                PageError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                PageError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<SessionError> for PageError {
    fn from(err: SessionError) -> Self {
        tracing::error!("Session error: {}", err);
        PageError::internal_server_error("Session could not be processed")
    }
}

// Standard error trait implementations
impl std::fmt::Display for PageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for PageError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for PageError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Html(self.to_document_html())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_errors_do_not_leak_sql() {
        let err: PageError = DatabaseError::QueryError("SELECT * FROM users -- boom".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message().contains("SELECT"));
    }

    #[test]
    fn pool_timeouts_are_unavailable() {
        let err: PageError = DatabaseError::Sqlx(sqlx::Error::PoolTimedOut).into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn notices_escape_messages() {
        let err = PageError::forbidden("<b>no</b>");
        let html = err.to_notice_html();
        assert!(html.contains("&lt;b&gt;no&lt;/b&gt;"));
        assert!(html.contains("FORBIDDEN"));
    }
}
