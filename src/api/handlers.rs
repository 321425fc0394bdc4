use crate::application::reservation::{
    ServiceDependencies, create_reservation as execute_create_reservation, get_reservation,
    list_active_reservations, list_overdue_reservations, list_reservations,
    list_reservations_by_status, list_reservations_by_user, return_book as execute_return_book,
};
use crate::domain::{ReservationId, UserId, commands::ReturnBook};
use axum::{
    Json,
    body::Bytes,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode, header},
};
use std::sync::Arc;

use super::{
    error::ApiError,
    types::{
        CreateReservationRequest, ListReservationsQuery, ReservationResponse, ReturnBookRequest,
        parse_status_filter,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}

/// 返却リクエストのボディを解釈する
///
/// 空のボディのみ省略として扱う。それ以外はJSONとして検証し、不正なら400。
fn parse_return_body(headers: &HeaderMap, body: &[u8]) -> Result<ReturnBookRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ReturnBookRequest::default());
    }

    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    if !is_json {
        return Err(ApiError::BadRequest(
            "Expected request with `Content-Type: application/json`".to_string(),
        ));
    }

    let Json(req) = Json::<ReturnBookRequest>::from_bytes(body)?;
    Ok(req)
}

// ============================================================================
// Command handlers (POST)
// ============================================================================

/// POST /reservations - 新しい予約を作成
pub async fn create_reservation(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateReservationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ReservationResponse>), ApiError> {
    let Json(req) = payload?;
    let view = execute_create_reservation(&state.service_deps, req.to_command()).await?;
    Ok((StatusCode::CREATED, Json(ReservationResponse::from(view))))
}

/// POST /reservations/:id/return - 書籍を返却
///
/// ボディまたはreturn_dateを省略した場合は当日の返却として扱う。
pub async fn return_book(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ReservationResponse>, ApiError> {
    let Path(reservation_id) = path?;
    let req = parse_return_body(&headers, &body)?;

    let cmd = ReturnBook {
        reservation_id: ReservationId::new(reservation_id),
        return_date: req.return_date.unwrap_or_else(today),
    };

    let view = execute_return_book(&state.service_deps, cmd).await?;
    Ok(Json(ReservationResponse::from(view)))
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET /reservations/:id - 予約詳細をIDで取得
pub async fn get_reservation_by_id(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<ReservationResponse>, ApiError> {
    let Path(reservation_id) = path?;
    let view = get_reservation(&state.service_deps, ReservationId::new(reservation_id)).await?;
    Ok(Json(ReservationResponse::from(view)))
}

/// GET /reservations - オプションフィルタ付き予約一覧取得
///
/// クエリパラメータ:
/// - user_id: 利用者IDでフィルタリング（オプション）
/// - status: ステータスでフィルタリング（ACTIVE, RETURNED）（オプション）
pub async fn list_all_reservations(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListReservationsQuery>, QueryRejection>,
) -> Result<Json<Vec<ReservationResponse>>, ApiError> {
    let Query(query) = query?;
    let status = query
        .status
        .as_deref()
        .map(parse_status_filter)
        .transpose()
        .map_err(ApiError::BadRequest)?;

    let views = match (query.user_id, status) {
        (Some(user_id), status) => {
            let views =
                list_reservations_by_user(&state.service_deps, UserId::new(user_id)).await?;
            views
                .into_iter()
                .filter(|view| status.is_none_or(|s| view.status == s))
                .collect::<Vec<_>>()
        }
        (None, Some(status)) => list_reservations_by_status(&state.service_deps, status).await?,
        (None, None) => list_reservations(&state.service_deps).await?,
    };

    Ok(Json(views.into_iter().map(ReservationResponse::from).collect()))
}

/// GET /reservations/active - 貸出中の予約一覧
pub async fn list_active(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ReservationResponse>>, ApiError> {
    let views = list_active_reservations(&state.service_deps).await?;
    Ok(Json(views.into_iter().map(ReservationResponse::from).collect()))
}

/// GET /reservations/overdue - 延滞中の予約一覧（当日UTC基準）
pub async fn list_overdue(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ReservationResponse>>, ApiError> {
    let views = list_overdue_reservations(&state.service_deps, today()).await?;
    Ok(Json(views.into_iter().map(ReservationResponse::from).collect()))
}
