use crate::application::reservation::{ErrorKind, ReservationError};
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub enum ApiError {
    Reservation(ReservationError),
    BadRequest(String),
}

impl From<ReservationError> for ApiError {
    fn from(err: ReservationError) -> Self {
        ApiError::Reservation(err)
    }
}

// 抽出エラーもJSONのErrorResponseで返す
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

fn error_code(err: &ReservationError) -> &'static str {
    match err {
        ReservationError::UserNotFound(_) => "USER_NOT_FOUND",
        ReservationError::BookNotFound(_) => "BOOK_NOT_FOUND",
        ReservationError::ReservationNotFound(_) => "RESERVATION_NOT_FOUND",
        ReservationError::BookNotAvailable(_) => "BOOK_NOT_AVAILABLE",
        ReservationError::AlreadyReturned(_) => "ALREADY_RETURNED",
        ReservationError::InvalidRequest(_) => "INVALID_REQUEST",
        ReservationError::StoreError(_) => "STORE_ERROR",
        ReservationError::UserDirectoryError(_) => "USER_DIRECTORY_ERROR",
        ReservationError::BookDirectoryError(_) => "BOOK_DIRECTORY_ERROR",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("BAD_REQUEST", msg),
            ),
            ApiError::Reservation(err) => {
                let code = error_code(&err);
                match err.kind() {
                    // 404 Not Found - 参照先が存在しない
                    ErrorKind::NotFound => {
                        (StatusCode::NOT_FOUND, ErrorResponse::new(code, err.to_string()))
                    }
                    // 409 Conflict - 状態と矛盾する操作
                    ErrorKind::Conflict => {
                        (StatusCode::CONFLICT, ErrorResponse::new(code, err.to_string()))
                    }
                    ErrorKind::InvalidRequest => (
                        StatusCode::BAD_REQUEST,
                        ErrorResponse::new(code, err.to_string()),
                    ),
                    // 500 Internal Server Error - 内部エラーの詳細はログにのみ記録する
                    ErrorKind::Internal => {
                        tracing::error!(error = ?err, "{}", err);
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            ErrorResponse::new(code, "An unexpected error occurred"),
                        )
                    }
                }
            }
        };

        (status, Json(body)).into_response()
    }
}
