use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{BookExternalId, ReservationId, UserId};

/// コマンド：書籍を予約する
///
/// 貸出日数はアプリケーション層で`RentalDays`に検証される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateReservation {
    pub user_id: UserId,
    pub book_external_id: BookExternalId,
    pub start_date: NaiveDate,
    pub rental_days: i64,
}

/// コマンド：書籍を返却する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnBook {
    pub reservation_id: ReservationId,
    pub return_date: NaiveDate,
}
