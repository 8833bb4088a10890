use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::response::{ApiResponse, Meta};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Room capacity is {capacity}, requested {requested} guests")]
    CapacityExceeded { requested: i32, capacity: i32 },

    #[error("Payment declined by gateway")]
    PaymentDeclined,

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("Database error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::CapacityExceeded { .. } => StatusCode::CONFLICT,
            AppError::PaymentDeclined => StatusCode::PAYMENT_REQUIRED,
            AppError::DbError(err) => {
                tracing::error!(error = %err, "store operation failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::OrmError(err) => {
                tracing::error!(error = %err, "store operation failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(ErrorData {
                error: self.to_string(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
