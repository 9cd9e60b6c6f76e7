use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use linkhop_auth::AuthError;
use linkhop_core::ShortenerError;
use linkhop_redirector::RedirectorError;
use serde::Serialize;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";
pub const RATE_LIMITED_MESSAGE: &str = "Too many requests, please try again later.";
pub const SHORT_URL_NOT_FOUND_MESSAGE: &str = "Short URL not found or inactive";

/// Every non-2xx response carries `{"message", "statusCode"}`.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    TooManyRequests,
    /// Logged in full; the client only sees a generic message.
    Internal(String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub message: String,
    pub status_code: u16,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_message(self) -> String {
        match self {
            AppError::BadRequest(message)
            | AppError::Unauthorized(message)
            | AppError::Forbidden(message)
            | AppError::NotFound(message) => message,
            AppError::TooManyRequests => RATE_LIMITED_MESSAGE.to_string(),
            AppError::Internal(detail) => {
                error!(error = %detail, "request failed");
                INTERNAL_ERROR_MESSAGE.to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            message: self.into_message(),
            status_code: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ShortenerError> for AppError {
    fn from(error: ShortenerError) -> Self {
        match error {
            ShortenerError::InvalidUrl(message) => AppError::BadRequest(message),
            ShortenerError::NotFound => AppError::NotFound("URL not found".to_string()),
            other @ (ShortenerError::AllocationExhausted { .. } | ShortenerError::Storage(_)) => {
                AppError::Internal(other.to_string())
            }
        }
    }
}

impl From<RedirectorError> for AppError {
    fn from(error: RedirectorError) -> Self {
        match error {
            RedirectorError::NotFound => {
                AppError::NotFound(SHORT_URL_NOT_FOUND_MESSAGE.to_string())
            }
            RedirectorError::Storage(source) => AppError::Internal(source.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Validation(message) => AppError::BadRequest(message),
            AuthError::EmailTaken => AppError::BadRequest(error.to_string()),
            AuthError::InvalidCredentials | AuthError::MissingToken | AuthError::InvalidToken => {
                AppError::Unauthorized(error.to_string())
            }
            AuthError::UserNotFound => AppError::NotFound(error.to_string()),
            AuthError::Hashing(_) | AuthError::Token(_) | AuthError::Storage(_) => {
                AppError::Internal(error.to_string())
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkhop_core::StorageError;

    #[test]
    fn storage_failures_are_internal() {
        let err = AppError::from(ShortenerError::Storage(StorageError::Unavailable(
            "pool closed".into(),
        )));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = AppError::from(ShortenerError::AllocationExhausted { attempts: 10 });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn auth_errors_map_to_client_statuses() {
        assert_eq!(
            AppError::from(AuthError::EmailTaken).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(AuthError::UserNotFound).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn internal_detail_is_not_leaked() {
        let err = AppError::Internal("secret dsn".into());
        assert_eq!(err.into_message(), INTERNAL_ERROR_MESSAGE);
    }
}
