use async_trait::async_trait;
use book_reservations::application::reservation::{
    ErrorKind, ReservationError, ServiceDependencies, create_reservation, get_reservation,
    list_active_reservations, list_overdue_reservations, list_reservations,
    list_reservations_by_status, list_reservations_by_user, return_book,
};
use book_reservations::domain::commands::*;
use book_reservations::domain::*;
use book_reservations::ports::*;
use chrono::NaiveDate;
use std::sync::Arc;

mod common;

use common::{BOOK_ID, USER_ID, date, money, setup, test_book, test_user};

fn create_cmd(rental_days: i64) -> CreateReservation {
    CreateReservation {
        user_id: UserId::new(USER_ID),
        book_external_id: BookExternalId::new(BOOK_ID),
        start_date: date(2024, 3, 1),
        rental_days,
    }
}

fn return_cmd(reservation_id: ReservationId, return_date: NaiveDate) -> ReturnBook {
    ReturnBook {
        reservation_id,
        return_date,
    }
}

// ============================================================================
// テスト用の失敗するアダプター
// ============================================================================

/// 保存に必ず失敗するReservationStore
struct FailingReservationStore;

#[async_trait]
impl ReservationStore for FailingReservationStore {
    async fn insert(
        &self,
        _reservation: NewReservation,
    ) -> reservation_store::Result<ActiveReservation> {
        Err("connection reset".into())
    }

    async fn mark_returned(
        &self,
        _reservation: &ReturnedReservation,
    ) -> reservation_store::Result<bool> {
        Err("connection reset".into())
    }

    async fn find_by_id(
        &self,
        _reservation_id: ReservationId,
    ) -> reservation_store::Result<Option<Reservation>> {
        Ok(None)
    }

    async fn find_by_user_id(
        &self,
        _user_id: UserId,
    ) -> reservation_store::Result<Vec<Reservation>> {
        Ok(vec![])
    }

    async fn find_by_status(
        &self,
        _status: ReservationStatus,
    ) -> reservation_store::Result<Vec<Reservation>> {
        Ok(vec![])
    }

    async fn find_by_status_and_expected_return_date_before(
        &self,
        _status: ReservationStatus,
        _date: NaiveDate,
    ) -> reservation_store::Result<Vec<Reservation>> {
        Ok(vec![])
    }

    async fn find_all(&self) -> reservation_store::Result<Vec<Reservation>> {
        Ok(vec![])
    }
}

/// 在庫の増減に必ず失敗するBookDirectory
struct UnreachableInventory;

#[async_trait]
impl BookDirectory for UnreachableInventory {
    async fn get_book_by_external_id(
        &self,
        _external_id: BookExternalId,
    ) -> book_directory::Result<Option<CatalogBook>> {
        Ok(Some(test_book(5)))
    }

    async fn decrease_available_quantity(
        &self,
        _external_id: BookExternalId,
    ) -> book_directory::Result<()> {
        Err(BookDirectoryError::Unavailable("timeout".into()))
    }

    async fn increase_available_quantity(
        &self,
        _external_id: BookExternalId,
    ) -> book_directory::Result<()> {
        Err(BookDirectoryError::Unavailable("timeout".into()))
    }
}

// ============================================================================
// 予約作成
// ============================================================================

#[tokio::test]
async fn test_create_reservation_success() {
    let ctx = setup();

    let view = create_reservation(&ctx.deps, create_cmd(7)).await.unwrap();

    assert_eq!(view.id, ReservationId::new(1));
    assert_eq!(view.user_id, UserId::new(USER_ID));
    assert_eq!(view.user_name, "Juan Pérez");
    assert_eq!(view.book_external_id, BookExternalId::new(BOOK_ID));
    assert_eq!(view.book_title, "The Lord of the Rings");
    assert_eq!(view.rental_days, 7);
    assert_eq!(view.start_date, date(2024, 3, 1));
    assert_eq!(view.expected_return_date, date(2024, 3, 8));
    assert_eq!(view.actual_return_date, None);
    assert_eq!(view.daily_rate, money("15.99"));
    assert_eq!(view.total_fee, money("111.93"));
    assert_eq!(view.late_fee, money("0.00"));
    assert_eq!(view.status, ReservationStatus::Active);

    // 在庫は1冊だけ減る
    assert_eq!(ctx.books.decrease_calls(), 1);
    assert_eq!(ctx.books.available_quantity(BookExternalId::new(BOOK_ID)), Some(4));
}

#[tokio::test]
async fn test_create_reservation_fails_when_user_not_found() {
    let ctx = setup();
    let cmd = CreateReservation {
        user_id: UserId::new(999),
        ..create_cmd(7)
    };

    let err = create_reservation(&ctx.deps, cmd).await.unwrap_err();

    assert!(matches!(err, ReservationError::UserNotFound(id) if id == UserId::new(999)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(list_reservations(&ctx.deps).await.unwrap().is_empty());
    assert_eq!(ctx.books.decrease_calls(), 0);
}

#[tokio::test]
async fn test_create_reservation_fails_when_book_not_in_catalog() {
    let ctx = setup();
    let cmd = CreateReservation {
        book_external_id: BookExternalId::new(1),
        ..create_cmd(7)
    };

    let err = create_reservation(&ctx.deps, cmd).await.unwrap_err();

    assert!(matches!(err, ReservationError::BookNotFound(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(ctx.books.decrease_calls(), 0);
}

#[tokio::test]
async fn test_create_reservation_fails_when_book_not_available() {
    let ctx = setup();
    ctx.books.add_book(test_book(0));

    let err = create_reservation(&ctx.deps, create_cmd(7)).await.unwrap_err();

    assert!(matches!(err, ReservationError::BookNotAvailable(_)));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    // 保存も在庫変更も行われない
    assert!(list_reservations(&ctx.deps).await.unwrap().is_empty());
    assert_eq!(ctx.books.decrease_calls(), 0);
    assert_eq!(ctx.books.available_quantity(BookExternalId::new(BOOK_ID)), Some(0));
}

#[tokio::test]
async fn test_create_reservation_rejects_non_positive_rental_days() {
    let ctx = setup();

    for days in [0, -1] {
        let err = create_reservation(&ctx.deps, create_cmd(days)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    assert!(list_reservations(&ctx.deps).await.unwrap().is_empty());
    assert_eq!(ctx.books.decrease_calls(), 0);
}

#[tokio::test]
async fn test_failed_save_does_not_touch_inventory() {
    let ctx = setup();
    let deps = ServiceDependencies {
        reservation_store: Arc::new(FailingReservationStore),
        ..ctx.deps.clone()
    };

    let err = create_reservation(&deps, create_cmd(7)).await.unwrap_err();

    assert!(matches!(err, ReservationError::StoreError(_)));
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert_eq!(ctx.books.decrease_calls(), 0);
    assert_eq!(ctx.books.available_quantity(BookExternalId::new(BOOK_ID)), Some(5));
}

#[tokio::test]
async fn test_inventory_failure_after_save_keeps_reservation() {
    let ctx = setup();
    let deps = ServiceDependencies {
        book_directory: Arc::new(UnreachableInventory),
        ..ctx.deps.clone()
    };

    let err = create_reservation(&deps, create_cmd(7)).await.unwrap_err();

    assert!(matches!(err, ReservationError::BookDirectoryError(_)));
    let stored = list_reservations(&ctx.deps).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].status, ReservationStatus::Active);
}

#[tokio::test]
async fn test_create_reservation_rejects_fee_over_max() {
    let ctx = setup();
    ctx.books.set_price(BookExternalId::new(BOOK_ID), money("5000000000.00"));

    let err = create_reservation(&ctx.deps, create_cmd(2)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    assert!(list_reservations(&ctx.deps).await.unwrap().is_empty());
    assert_eq!(ctx.books.decrease_calls(), 0);
}

#[tokio::test]
async fn test_create_reservation_with_huge_price_does_not_panic() {
    let ctx = setup();
    ctx.books.set_price(
        BookExternalId::new(BOOK_ID),
        money("1000000000000000000000000"),
    );

    // 日額 × 日数がDecimalの範囲を超える
    let err = create_reservation(&ctx.deps, create_cmd(90_000_000))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    assert_eq!(ctx.books.decrease_calls(), 0);
}

// ============================================================================
// 返却
// ============================================================================

#[tokio::test]
async fn test_return_on_expected_date_has_no_late_fee() {
    let ctx = setup();
    let created = create_reservation(&ctx.deps, create_cmd(7)).await.unwrap();

    let view = return_book(&ctx.deps, return_cmd(created.id, date(2024, 3, 8)))
        .await
        .unwrap();

    assert_eq!(view.status, ReservationStatus::Returned);
    assert_eq!(view.actual_return_date, Some(date(2024, 3, 8)));
    assert_eq!(view.late_fee, money("0.00"));
    assert_eq!(view.total_fee, money("111.93"));
    assert_eq!(view.created_at, created.created_at);

    // 在庫は元に戻る
    assert_eq!(ctx.books.increase_calls(), 1);
    assert_eq!(ctx.books.available_quantity(BookExternalId::new(BOOK_ID)), Some(5));
}

#[tokio::test]
async fn test_return_three_days_late_adds_late_fee() {
    let ctx = setup();
    let created = create_reservation(&ctx.deps, create_cmd(7)).await.unwrap();

    let view = return_book(&ctx.deps, return_cmd(created.id, date(2024, 3, 11)))
        .await
        .unwrap();

    assert_eq!(view.late_fee, money("7.20"));
    assert_eq!(view.total_fee, money("119.13"));
    assert_eq!(view.status, ReservationStatus::Returned);
}

#[tokio::test]
async fn test_catalog_price_change_does_not_affect_fees() {
    let ctx = setup();
    let created = create_reservation(&ctx.deps, create_cmd(7)).await.unwrap();
    ctx.books.set_price(BookExternalId::new(BOOK_ID), money("99.99"));

    let view = return_book(&ctx.deps, return_cmd(created.id, date(2024, 3, 11)))
        .await
        .unwrap();

    assert_eq!(view.daily_rate, money("15.99"));
    assert_eq!(view.late_fee, money("7.20"));
    assert_eq!(view.total_fee, money("119.13"));
}

#[tokio::test]
async fn test_return_with_total_over_max_leaves_reservation_active() {
    let ctx = setup();
    ctx.books.set_price(BookExternalId::new(BOOK_ID), money("1000000000.00"));
    let created = create_reservation(&ctx.deps, create_cmd(7)).await.unwrap();
    assert_eq!(created.total_fee, money("7000000000.00"));

    // 30日遅れ: 7,000,000,000.00 + 4,500,000,000.00
    let err = return_book(&ctx.deps, return_cmd(created.id, date(2024, 4, 7)))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    let stored = get_reservation(&ctx.deps, created.id).await.unwrap();
    assert_eq!(stored.status, ReservationStatus::Active);
    assert_eq!(ctx.books.increase_calls(), 0);
}

#[tokio::test]
async fn test_return_twice_is_rejected_and_leaves_record_unchanged() {
    let ctx = setup();
    let created = create_reservation(&ctx.deps, create_cmd(7)).await.unwrap();
    let first = return_book(&ctx.deps, return_cmd(created.id, date(2024, 3, 11)))
        .await
        .unwrap();

    let err = return_book(&ctx.deps, return_cmd(created.id, date(2024, 3, 20)))
        .await
        .unwrap_err();

    assert!(matches!(err, ReservationError::AlreadyReturned(id) if id == created.id));
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let stored = get_reservation(&ctx.deps, created.id).await.unwrap();
    assert_eq!(stored, first);
    assert_eq!(ctx.books.increase_calls(), 1);
}

#[tokio::test]
async fn test_return_unknown_reservation() {
    let ctx = setup();

    let err = return_book(&ctx.deps, return_cmd(ReservationId::new(42), date(2024, 3, 8)))
        .await
        .unwrap_err();

    assert!(matches!(err, ReservationError::ReservationNotFound(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(ctx.books.increase_calls(), 0);
}

#[tokio::test]
async fn test_return_succeeds_when_book_left_catalog() {
    let ctx = setup();
    let created = create_reservation(&ctx.deps, create_cmd(7)).await.unwrap();
    ctx.books.remove_book(BookExternalId::new(BOOK_ID));

    let view = return_book(&ctx.deps, return_cmd(created.id, date(2024, 3, 9)))
        .await
        .unwrap();

    assert_eq!(view.status, ReservationStatus::Returned);
    assert_eq!(view.late_fee, money("2.40"));
    assert_eq!(ctx.books.available_quantity(BookExternalId::new(BOOK_ID)), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_returns_only_one_succeeds() {
    let ctx = setup();
    let created = create_reservation(&ctx.deps, create_cmd(7)).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let deps = ctx.deps.clone();
        let cmd = return_cmd(created.id, date(2024, 3, 11));
        handles.push(tokio::spawn(async move { return_book(&deps, cmd).await }));
    }

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(err) => assert_eq!(err.kind(), ErrorKind::Conflict),
        }
    }

    assert_eq!(succeeded, 1);
    assert_eq!(ctx.books.increase_calls(), 1);
    assert_eq!(ctx.books.available_quantity(BookExternalId::new(BOOK_ID)), Some(5));
}

// ============================================================================
// クエリ
// ============================================================================

#[tokio::test]
async fn test_get_reservation_by_id() {
    let ctx = setup();
    let created = create_reservation(&ctx.deps, create_cmd(7)).await.unwrap();

    let found = get_reservation(&ctx.deps, created.id).await.unwrap();
    assert_eq!(found, created);

    let err = get_reservation(&ctx.deps, ReservationId::new(999)).await.unwrap_err();
    assert!(matches!(err, ReservationError::ReservationNotFound(_)));
}

#[tokio::test]
async fn test_list_queries() {
    let ctx = setup();
    let other_user = User {
        id: UserId::new(2),
        name: "Ana Gómez".to_string(),
        email: "ana@example.com".to_string(),
    };
    ctx.users.add_user(other_user.clone());

    let first = create_reservation(&ctx.deps, create_cmd(7)).await.unwrap();
    let second = create_reservation(
        &ctx.deps,
        CreateReservation {
            user_id: other_user.id,
            ..create_cmd(3)
        },
    )
    .await
    .unwrap();
    return_book(&ctx.deps, return_cmd(first.id, date(2024, 3, 5)))
        .await
        .unwrap();

    assert_eq!(list_reservations(&ctx.deps).await.unwrap().len(), 2);

    let by_user = list_reservations_by_user(&ctx.deps, UserId::new(USER_ID))
        .await
        .unwrap();
    assert_eq!(by_user.len(), 1);
    assert_eq!(by_user[0].id, first.id);
    assert!(
        list_reservations_by_user(&ctx.deps, UserId::new(77))
            .await
            .unwrap()
            .is_empty()
    );

    let returned = list_reservations_by_status(&ctx.deps, ReservationStatus::Returned)
        .await
        .unwrap();
    assert_eq!(returned.len(), 1);
    assert_eq!(returned[0].id, first.id);

    let active = list_active_reservations(&ctx.deps).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, second.id);
    assert_eq!(active[0].user_name, "Ana Gómez");
}

#[tokio::test]
async fn test_overdue_excludes_due_today_and_returned() {
    let ctx = setup();
    // 返却予定日: 3/4, 3/8, 3/8(返却済み)
    let due_march_4 = create_reservation(&ctx.deps, create_cmd(3)).await.unwrap();
    let due_march_8 = create_reservation(&ctx.deps, create_cmd(7)).await.unwrap();
    let returned = create_reservation(&ctx.deps, create_cmd(7)).await.unwrap();
    return_book(&ctx.deps, return_cmd(returned.id, date(2024, 3, 12)))
        .await
        .unwrap();

    let overdue = list_overdue_reservations(&ctx.deps, date(2024, 3, 8))
        .await
        .unwrap();
    let ids: Vec<_> = overdue.iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![due_march_4.id]);

    let overdue = list_overdue_reservations(&ctx.deps, date(2024, 3, 9))
        .await
        .unwrap();
    let ids: Vec<_> = overdue.iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![due_march_4.id, due_march_8.id]);

    assert!(
        list_overdue_reservations(&ctx.deps, date(2024, 3, 4))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_user_is_resolved_at_creation_only() {
    let ctx = setup();
    let created = create_reservation(&ctx.deps, create_cmd(7)).await.unwrap();

    // 利用者名を変更しても既存の予約の表示名は変わらない
    ctx.users.add_user(User {
        name: "Juan P.".to_string(),
        ..test_user()
    });

    let found = get_reservation(&ctx.deps, created.id).await.unwrap();
    assert_eq!(found.user_name, "Juan Pérez");
}
