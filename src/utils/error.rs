use std::fmt;

use actix_web::HttpResponse;
use serde_json::json;

/// Message returned for 500 bodies outside development mode
const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Database(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Database(msg) => write!(f, "Database error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for AppError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// True when APP_ENV=development. 500 bodies then expose the underlying
/// error text instead of the generic message.
pub fn is_development() -> bool {
    std::env::var("APP_ENV")
        .map(|v| v == "development")
        .unwrap_or(false)
}

impl AppError {
    /// Build the HTTP response for this error. Every body has the shape
    /// `{error, message}`. `context` is the route summary used as the
    /// `error` field on 500s, e.g. "Error fetching stats".
    pub fn to_response(&self, context: &str) -> HttpResponse {
        match self {
            AppError::BadRequest(msg) => HttpResponse::BadRequest().json(json!({
                "error": msg,
                "message": msg,
            })),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({
                "error": msg,
                "message": msg,
            })),
            AppError::Database(detail) | AppError::Internal(detail) => {
                log::error!("❌ {}: {}", context, detail);
                let message = if is_development() {
                    detail.clone()
                } else {
                    INTERNAL_MESSAGE.to_string()
                };
                HttpResponse::InternalServerError().json(json!({
                    "error": context,
                    "message": message,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formats() {
        let err = AppError::NotFound("User not found".to_string());
        assert_eq!(err.to_string(), "Not found: User not found");

        let err = AppError::BadRequest("Invalid user ID".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid user ID");
    }

    #[test]
    fn test_client_error_statuses() {
        let err = AppError::BadRequest("Invalid campaign ID".to_string());
        assert_eq!(err.to_response("Error fetching campaign").status(), 400);

        let err = AppError::NotFound("Campaign not found".to_string());
        assert_eq!(err.to_response("Error fetching campaign").status(), 404);
    }

    #[test]
    fn test_server_error_status() {
        let err = AppError::Database("connection reset".to_string());
        assert_eq!(err.to_response("Error fetching stats").status(), 500);
    }
}
