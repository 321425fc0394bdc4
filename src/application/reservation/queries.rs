use crate::domain::{Reservation, ReservationId, ReservationStatus, UserId};
use chrono::NaiveDate;

use super::errors::{ReservationError, Result};
use super::reservation_service::{ServiceDependencies, load_reservation};
use super::view::ReservationView;

fn to_views(reservations: Vec<Reservation>) -> Vec<ReservationView> {
    reservations.iter().map(ReservationView::from).collect()
}

/// IDで予約を取得する
pub async fn get_reservation(
    deps: &ServiceDependencies,
    reservation_id: ReservationId,
) -> Result<ReservationView> {
    let reservation = load_reservation(&deps.reservation_store, reservation_id).await?;
    Ok(ReservationView::from(reservation))
}

/// 全予約を取得する
pub async fn list_reservations(deps: &ServiceDependencies) -> Result<Vec<ReservationView>> {
    let reservations = deps
        .reservation_store
        .find_all()
        .await
        .map_err(ReservationError::StoreError)?;
    Ok(to_views(reservations))
}

/// 利用者の全予約を取得する
pub async fn list_reservations_by_user(
    deps: &ServiceDependencies,
    user_id: UserId,
) -> Result<Vec<ReservationView>> {
    let reservations = deps
        .reservation_store
        .find_by_user_id(user_id)
        .await
        .map_err(ReservationError::StoreError)?;
    Ok(to_views(reservations))
}

/// ステータスで予約を検索する
pub async fn list_reservations_by_status(
    deps: &ServiceDependencies,
    status: ReservationStatus,
) -> Result<Vec<ReservationView>> {
    let reservations = deps
        .reservation_store
        .find_by_status(status)
        .await
        .map_err(ReservationError::StoreError)?;
    Ok(to_views(reservations))
}

/// 貸出中の予約を取得する
pub async fn list_active_reservations(deps: &ServiceDependencies) -> Result<Vec<ReservationView>> {
    list_reservations_by_status(deps, ReservationStatus::Active).await
}

/// 延滞中の予約を取得する
///
/// 貸出中かつ返却予定日が`as_of`より前の予約。
/// 返却予定日が`as_of`当日の予約は含まない。
pub async fn list_overdue_reservations(
    deps: &ServiceDependencies,
    as_of: NaiveDate,
) -> Result<Vec<ReservationView>> {
    let reservations = deps
        .reservation_store
        .find_by_status_and_expected_return_date_before(ReservationStatus::Active, as_of)
        .await
        .map_err(ReservationError::StoreError)?;
    Ok(to_views(reservations))
}
