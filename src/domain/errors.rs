use std::fmt;

use super::{BookExternalId, RentalDaysError};

/// 料金が扱える上限を超えた
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeOutOfRange;

impl fmt::Display for FeeOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fee exceeds the maximum amount")
    }
}

/// 予約作成のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateReservationError {
    /// 在庫がなく予約不可
    BookNotAvailable(BookExternalId),
    /// 貸出日数が不正
    InvalidRentalDays(RentalDaysError),
    /// 料金が上限を超える
    FeeOutOfRange,
}

impl From<RentalDaysError> for CreateReservationError {
    fn from(err: RentalDaysError) -> Self {
        CreateReservationError::InvalidRentalDays(err)
    }
}

impl From<FeeOutOfRange> for CreateReservationError {
    fn from(_: FeeOutOfRange) -> Self {
        CreateReservationError::FeeOutOfRange
    }
}

/// 返却のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnBookError {
    /// 既に返却済み
    AlreadyReturned,
    /// 延滞料金を含む合計が上限を超える
    FeeOutOfRange,
}

impl From<FeeOutOfRange> for ReturnBookError {
    fn from(_: FeeOutOfRange) -> Self {
        ReturnBookError::FeeOutOfRange
    }
}
