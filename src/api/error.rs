use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use log::error;

use super::dto::ErrorResponse;
use crate::error::ExchangeError;

impl ExchangeError {
    fn kind(&self) -> &'static str {
        match self {
            ExchangeError::NotFound(_) => "not_found",
            ExchangeError::ServiceUnavailable(_) => "service_unavailable",
            ExchangeError::InvalidInput(_) => "invalid_input",
            ExchangeError::InvalidRate(_) => "invalid_rate",
            ExchangeError::Conflict(_) => "conflict",
            ExchangeError::Storage(_) => "storage",
        }
    }
}

impl ResponseError for ExchangeError {
    fn status_code(&self) -> StatusCode {
        match self {
            ExchangeError::NotFound(_) => StatusCode::NOT_FOUND,
            ExchangeError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ExchangeError::InvalidInput(_) | ExchangeError::InvalidRate(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ExchangeError::Conflict(_) => StatusCode::CONFLICT,
            ExchangeError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ExchangeError::Storage(e) => {
                error!("storage failure: {}", e);
                "internal storage error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.kind(),
            message,
        })
    }
}
