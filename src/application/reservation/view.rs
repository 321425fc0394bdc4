use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{
    BookExternalId, Money, Reservation, ReservationId, ReservationStatus, UserId,
};

/// 予約ビュー
///
/// 永続化された予約をプレゼンテーション層向けに平坦化したもの。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationView {
    pub id: ReservationId,
    pub user_id: UserId,
    pub user_name: String,
    pub book_external_id: BookExternalId,
    pub book_title: String,
    pub rental_days: u32,
    pub start_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
    pub daily_rate: Money,
    pub total_fee: Money,
    pub late_fee: Money,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&Reservation> for ReservationView {
    fn from(reservation: &Reservation) -> Self {
        let core = reservation.core();
        Self {
            id: core.reservation_id,
            user_id: core.user_id,
            user_name: core.user_name.clone(),
            book_external_id: core.book.external_id,
            book_title: core.book.title.clone(),
            rental_days: core.rental_days.value(),
            start_date: core.start_date,
            expected_return_date: core.expected_return_date,
            actual_return_date: reservation.actual_return_date(),
            daily_rate: core.daily_rate,
            total_fee: core.total_fee,
            late_fee: reservation.late_fee(),
            status: reservation.status(),
            created_at: core.created_at,
        }
    }
}

impl From<Reservation> for ReservationView {
    fn from(reservation: Reservation) -> Self {
        Self::from(&reservation)
    }
}
