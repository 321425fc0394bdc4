use crate::domain::{
    self, FeeOutOfRange, Reservation, ReturnBookError, ReturnedReservation, commands::*,
    value_objects::*,
};
use crate::ports::*;
use std::sync::Arc;

use super::errors::{ReservationError, Result};
use super::view::ReservationView;

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、純粋な関数に依存関係を渡す。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub reservation_store: Arc<dyn ReservationStore>,
    pub user_directory: Arc<dyn UserDirectory>,
    pub book_directory: Arc<dyn BookDirectory>,
}

/// ストアから予約を取得するヘルパー関数
///
/// # エラー
/// - StoreError: 読み込み失敗
/// - ReservationNotFound: 予約が存在しない
pub(super) async fn load_reservation(
    store: &Arc<dyn ReservationStore>,
    reservation_id: ReservationId,
) -> Result<Reservation> {
    store
        .find_by_id(reservation_id)
        .await
        .map_err(ReservationError::StoreError)?
        .ok_or(ReservationError::ReservationNotFound(reservation_id))
}

/// 書籍を予約する
///
/// ビジネスルール：
/// - 貸出日数が1以上であること
/// - 利用者が存在すること
/// - 書籍がカタログに存在し、在庫が1冊以上あること
///
/// # 在庫との整合性
///
/// 在庫の減算は予約の保存に成功した後にのみ行う。
/// 保存に失敗した場合、在庫は一切変更されない。
/// 保存後に在庫の減算が失敗した場合はエラーを返すが、予約は残る。
///
/// # 引数
/// * `deps` - サービスの依存関係
/// * `cmd` - 予約コマンド
///
/// # 戻り値
/// 保存された予約のビュー
pub async fn create_reservation(
    deps: &ServiceDependencies,
    cmd: CreateReservation,
) -> Result<ReservationView> {
    // 1. 貸出日数の検証
    let rental_days = RentalDays::try_from(cmd.rental_days)
        .map_err(|e| ReservationError::InvalidRequest(e.to_string()))?;

    // 2. 利用者の存在確認
    let user = deps
        .user_directory
        .get_user(cmd.user_id)
        .await
        .map_err(ReservationError::UserDirectoryError)?
        .ok_or(ReservationError::UserNotFound(cmd.user_id))?;

    // 3. 書籍の取得
    let book = deps
        .book_directory
        .get_book_by_external_id(cmd.book_external_id)
        .await
        .map_err(ReservationError::BookDirectoryError)?
        .ok_or(ReservationError::BookNotFound(cmd.book_external_id))?;

    // 4. ドメイン層の純粋関数を呼び出し（在庫確認・スナップショット・料金計算）
    let new_reservation =
        domain::reservation::open_reservation(&user, &book, cmd.start_date, rental_days)?;

    // 5. 保存
    let saved = deps
        .reservation_store
        .insert(new_reservation)
        .await
        .map_err(ReservationError::StoreError)?;

    // 6. 保存に成功した後で在庫を減らす
    if let Err(e) = deps
        .book_directory
        .decrease_available_quantity(saved.book.external_id)
        .await
    {
        tracing::error!(
            reservation_id = %saved.reservation_id,
            book_external_id = %saved.book.external_id,
            error = %e,
            "Reservation saved but inventory decrement failed"
        );
        return Err(ReservationError::BookDirectoryError(e));
    }

    tracing::info!(
        reservation_id = %saved.reservation_id,
        user_id = %saved.user_id,
        book_external_id = %saved.book.external_id,
        total_fee = %saved.total_fee,
        "Reservation created"
    );

    Ok(ReservationView::from(Reservation::Active(saved)))
}

/// 書籍を返却する
///
/// ビジネスルール：
/// - 予約が存在すること
/// - 予約が貸出中であること（返却済みは返却不可）
/// - 返却予定日を過ぎていれば延滞料金を加算する
///
/// # 同時実行
///
/// 保存はストアの check-and-set で行う。同じ予約への同時返却では
/// 1つだけが成功し、残りは`AlreadyReturned`になる。
/// 在庫の加算は check-and-set に成功した呼び出しだけが行う。
///
/// # 引数
/// * `deps` - サービスの依存関係
/// * `cmd` - 返却コマンド
pub async fn return_book(deps: &ServiceDependencies, cmd: ReturnBook) -> Result<ReservationView> {
    // 1. 予約の取得
    let reservation = load_reservation(&deps.reservation_store, cmd.reservation_id).await?;

    // 2. ドメイン層の純粋関数を呼び出し（状態確認・延滞料金・合計料金）
    let returned = domain::reservation::return_reservation(reservation, cmd.return_date)
        .map_err(|e| match e {
            ReturnBookError::AlreadyReturned => {
                ReservationError::AlreadyReturned(cmd.reservation_id)
            }
            ReturnBookError::FeeOutOfRange => {
                ReservationError::InvalidRequest(FeeOutOfRange.to_string())
            }
        })?;

    // 3. 貸出中の場合のみ保存
    let committed = deps
        .reservation_store
        .mark_returned(&returned)
        .await
        .map_err(ReservationError::StoreError)?;

    if !committed {
        return Err(ReservationError::AlreadyReturned(cmd.reservation_id));
    }

    // 4. 保存に成功した後で在庫を戻す
    restock(&deps.book_directory, &returned).await?;

    tracing::info!(
        reservation_id = %returned.reservation_id,
        actual_return_date = %returned.actual_return_date,
        late_fee = %returned.late_fee,
        total_fee = %returned.total_fee,
        "Book returned"
    );

    Ok(ReservationView::from(Reservation::Returned(returned)))
}

/// 返却された書籍の在庫を1冊戻す
///
/// カタログから書籍が消えている場合は警告のみで返却自体は成功させる。
async fn restock(
    book_directory: &Arc<dyn BookDirectory>,
    returned: &ReturnedReservation,
) -> Result<()> {
    match book_directory
        .increase_available_quantity(returned.book.external_id)
        .await
    {
        Ok(()) => Ok(()),
        Err(BookDirectoryError::NotFound(external_id)) => {
            tracing::warn!(
                reservation_id = %returned.reservation_id,
                book_external_id = %external_id,
                "Book no longer in catalog, skipping inventory increment"
            );
            Ok(())
        }
        Err(e) => Err(ReservationError::BookDirectoryError(e)),
    }
}
