use crate::domain::{BookExternalId, CreateReservationError, FeeOutOfRange, ReservationId, UserId};
use crate::ports::BookDirectoryError as DirectoryError;
use thiserror::Error;

/// 予約管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum ReservationError {
    /// 利用者が存在しない
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// 書籍がカタログに存在しない
    #[error("Book not found: {0}")]
    BookNotFound(BookExternalId),

    /// 予約が存在しない
    #[error("Reservation not found: {0}")]
    ReservationNotFound(ReservationId),

    /// 在庫がなく予約不可
    #[error("Book {0} is not available for reservation")]
    BookNotAvailable(BookExternalId),

    /// 既に返却済み
    #[error("Reservation {0} has already been returned")]
    AlreadyReturned(ReservationId),

    /// リクエストの値が不正
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// ReservationStoreのエラー
    #[error("Reservation store error")]
    StoreError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// UserDirectoryのエラー
    #[error("User directory error")]
    UserDirectoryError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// BookDirectoryのエラー
    #[error("Book directory error")]
    BookDirectoryError(#[source] DirectoryError),
}

/// エラーの分類
///
/// プレゼンテーション層はこの分類でステータスコードを決める。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidRequest,
    Internal,
}

impl ReservationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReservationError::UserNotFound(_)
            | ReservationError::BookNotFound(_)
            | ReservationError::ReservationNotFound(_) => ErrorKind::NotFound,
            ReservationError::BookNotAvailable(_) | ReservationError::AlreadyReturned(_) => {
                ErrorKind::Conflict
            }
            ReservationError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            ReservationError::StoreError(_)
            | ReservationError::UserDirectoryError(_)
            | ReservationError::BookDirectoryError(_) => ErrorKind::Internal,
        }
    }
}

impl From<CreateReservationError> for ReservationError {
    fn from(err: CreateReservationError) -> Self {
        match err {
            CreateReservationError::BookNotAvailable(external_id) => {
                ReservationError::BookNotAvailable(external_id)
            }
            CreateReservationError::InvalidRentalDays(e) => {
                ReservationError::InvalidRequest(e.to_string())
            }
            CreateReservationError::FeeOutOfRange => {
                ReservationError::InvalidRequest(FeeOutOfRange.to_string())
            }
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, ReservationError>;
