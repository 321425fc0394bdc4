use crate::domain::{
    ActiveReservation, NewReservation, Reservation, ReservationId, ReservationStatus,
    ReturnedReservation, UserId,
};
use async_trait::async_trait;
use chrono::NaiveDate;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 予約ストアポート
///
/// 予約の永続化と検索を抽象化する。予約は削除されない。
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// 新しい予約を保存する
    ///
    /// IDと作成日時はここで採番される。
    async fn insert(&self, reservation: NewReservation) -> Result<ActiveReservation>;

    /// 返却済みの予約を保存する
    ///
    /// 保存済みの予約がまだ貸出中の場合のみ更新する（アトミックな check-and-set）。
    /// 既に返却済み、または存在しない場合は何も変更せず`false`を返す。
    /// 同じ予約への同時返却のうち、`true`を受け取るのは1つだけ。
    async fn mark_returned(&self, reservation: &ReturnedReservation) -> Result<bool>;

    /// IDで予約を取得する
    async fn find_by_id(&self, reservation_id: ReservationId) -> Result<Option<Reservation>>;

    /// 利用者の全予約を取得する
    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Reservation>>;

    /// ステータスで予約を検索する
    async fn find_by_status(&self, status: ReservationStatus) -> Result<Vec<Reservation>>;

    /// 指定ステータスかつ返却予定日が基準日より前の予約を検索する
    ///
    /// 延滞検索に使用される。基準日当日が返却予定日の予約は含まない。
    async fn find_by_status_and_expected_return_date_before(
        &self,
        status: ReservationStatus,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>>;

    /// 全予約を取得する
    async fn find_all(&self) -> Result<Vec<Reservation>>;
}
