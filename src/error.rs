use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not Authorized Login Again")]
    NotAuthorized,

    #[error("{0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("{0}")]
    Database(#[from] mongodb::error::Error),

    #[error("{0}")]
    InvalidId(#[from] mongodb::bson::oid::Error),

    #[error("{0}")]
    Bson(#[from] mongodb::bson::ser::Error),

    #[error("{0}")]
    Hash(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),
}

/// Every failure leaves the service as `{"success": false, "message": ...}`.
#[derive(Serialize)]
struct FailureBody {
    success: bool,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::NotAuthorized | AppError::Token { .. } => StatusCode::UNAUTHORIZED,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::InvalidId { .. }
            | AppError::Multipart { .. }
            | AppError::MissingField { .. }
            | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Database { .. }
            | AppError::Bson { .. }
            | AppError::Hash { .. }
            | AppError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = FailureBody {
            success: false,
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
