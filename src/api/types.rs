use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::reservation::ReservationView;
use crate::domain::{BookExternalId, ReservationStatus, UserId, commands::CreateReservation};

/// 予約作成リクエスト（POST /reservations）
#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    pub user_id: i64,
    pub book_external_id: i64,
    pub start_date: NaiveDate,
    pub rental_days: i64,
}

impl CreateReservationRequest {
    pub fn to_command(&self) -> CreateReservation {
        CreateReservation {
            user_id: UserId::new(self.user_id),
            book_external_id: BookExternalId::new(self.book_external_id),
            start_date: self.start_date,
            rental_days: self.rental_days,
        }
    }
}

/// 返却リクエスト（POST /reservations/:id/return）
///
/// return_dateを省略した場合は当日（UTC）で返却する。
#[derive(Debug, Default, Deserialize)]
pub struct ReturnBookRequest {
    pub return_date: Option<NaiveDate>,
}

/// 予約一覧取得のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct ListReservationsQuery {
    /// 利用者IDでフィルタリング
    pub user_id: Option<i64>,
    /// ステータスでフィルタリング
    pub status: Option<String>,
}

/// 予約レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ReservationResponse {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub book_external_id: i64,
    pub book_title: String,
    pub rental_days: u32,
    pub start_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
    pub daily_rate: Decimal,
    pub total_fee: Decimal,
    pub late_fee: Decimal,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
}

impl From<ReservationView> for ReservationResponse {
    fn from(view: ReservationView) -> Self {
        Self {
            id: view.id.value(),
            user_id: view.user_id.value(),
            user_name: view.user_name,
            book_external_id: view.book_external_id.value(),
            book_title: view.book_title,
            rental_days: view.rental_days,
            start_date: view.start_date,
            expected_return_date: view.expected_return_date,
            actual_return_date: view.actual_return_date,
            daily_rate: view.daily_rate.value(),
            total_fee: view.total_fee.value(),
            late_fee: view.late_fee.value(),
            status: view.status,
            created_at: view.created_at,
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

/// ステータスクエリパラメータのパースとバリデーション
pub fn parse_status_filter(status: &str) -> Result<ReservationStatus, String> {
    status.parse::<ReservationStatus>()
}
