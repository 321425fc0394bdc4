use crate::domain::{
    ActiveReservation, BookExternalId, BookSnapshot, Money, NewReservation, RentalDays,
    Reservation, ReservationCore, ReservationId, ReservationStatus, ReservationTerms,
    ReturnedReservation, UserId,
};
use crate::ports::reservation_store::{ReservationStore as ReservationStoreTrait, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;

const SELECT_RESERVATIONS: &str = r#"
    SELECT
        id,
        user_id,
        user_name,
        book_external_id,
        book_title,
        book_authors,
        book_price,
        rental_days,
        daily_rate,
        start_date,
        expected_return_date,
        actual_return_date,
        total_fee,
        late_fee,
        status,
        created_at
    FROM reservations
"#;

fn invalid_data(message: String) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message))
}

/// PostgreSQLの行データをReservationに変換する
///
/// statusとactual_return_dateの組み合わせが不正な行はエラーにする。
fn map_row_to_reservation(row: &PgRow) -> Result<Reservation> {
    let rental_days_i32: i32 = row.try_get("rental_days")?;
    let rental_days = RentalDays::try_from(i64::from(rental_days_i32))
        .map_err(|e| invalid_data(format!("rental_days: {}", e)))?;

    let status_str: &str = row.try_get("status")?;
    let status = ReservationStatus::from_str(status_str).map_err(invalid_data)?;

    let book_price: Decimal = row.try_get("book_price")?;
    let daily_rate: Decimal = row.try_get("daily_rate")?;
    let total_fee: Decimal = row.try_get("total_fee")?;

    let core = ReservationCore {
        reservation_id: ReservationId::new(row.try_get("id")?),
        terms: ReservationTerms {
            user_id: UserId::new(row.try_get("user_id")?),
            user_name: row.try_get("user_name")?,
            book: BookSnapshot {
                external_id: BookExternalId::new(row.try_get("book_external_id")?),
                title: row.try_get("book_title")?,
                author_names: row.try_get("book_authors")?,
                price: Money::new(book_price),
            },
            rental_days,
            daily_rate: Money::new(daily_rate),
            start_date: row.try_get("start_date")?,
            expected_return_date: row.try_get("expected_return_date")?,
        },
        total_fee: Money::new(total_fee),
        created_at: row.try_get("created_at")?,
    };

    match status {
        ReservationStatus::Active => Ok(Reservation::Active(ActiveReservation { core })),
        ReservationStatus::Returned => {
            let actual_return_date: Option<NaiveDate> = row.try_get("actual_return_date")?;
            let actual_return_date = actual_return_date.ok_or_else(|| {
                invalid_data(format!(
                    "returned reservation {} has no actual_return_date",
                    core.reservation_id
                ))
            })?;
            let late_fee: Decimal = row.try_get("late_fee")?;
            Ok(Reservation::Returned(ReturnedReservation {
                core,
                actual_return_date,
                late_fee: Money::new(late_fee),
            }))
        }
    }
}

/// ReservationStoreのPostgreSQL実装
#[derive(Clone)]
pub struct ReservationStore {
    pool: PgPool,
}

impl ReservationStore {
    /// PostgreSQLコネクションプールから新しいReservationStoreを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationStoreTrait for ReservationStore {
    /// 予約を挿入し、採番されたIDと作成日時を返す
    async fn insert(&self, reservation: NewReservation) -> Result<ActiveReservation> {
        let terms = reservation.terms;
        let rental_days = i32::try_from(terms.rental_days.value())?;

        let row = sqlx::query(
            r#"
            INSERT INTO reservations (
                user_id,
                user_name,
                book_external_id,
                book_title,
                book_authors,
                book_price,
                rental_days,
                daily_rate,
                start_date,
                expected_return_date,
                total_fee,
                late_fee,
                status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 0.00, 'ACTIVE')
            RETURNING id, created_at
            "#,
        )
        .bind(terms.user_id.value())
        .bind(&terms.user_name)
        .bind(terms.book.external_id.value())
        .bind(&terms.book.title)
        .bind(&terms.book.author_names)
        .bind(terms.book.price.value())
        .bind(rental_days)
        .bind(terms.daily_rate.value())
        .bind(terms.start_date)
        .bind(terms.expected_return_date)
        .bind(reservation.total_fee.value())
        .fetch_one(&self.pool)
        .await?;

        let reservation_id: i64 = row.try_get("id")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;

        Ok(ActiveReservation {
            core: ReservationCore {
                reservation_id: ReservationId::new(reservation_id),
                terms,
                total_fee: reservation.total_fee,
                created_at,
            },
        })
    }

    /// 返却を保存する（check-and-set）
    ///
    /// `WHERE status = 'ACTIVE'`の条件付きUPDATEで行ロックを取り、
    /// 同時返却のうち1件だけが行を更新する。
    async fn mark_returned(&self, reservation: &ReturnedReservation) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE reservations
            SET status = 'RETURNED',
                actual_return_date = $2,
                late_fee = $3,
                total_fee = $4
            WHERE id = $1 AND status = 'ACTIVE'
            "#,
        )
        .bind(reservation.reservation_id.value())
        .bind(reservation.actual_return_date)
        .bind(reservation.late_fee.value())
        .bind(reservation.total_fee.value())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_by_id(&self, reservation_id: ReservationId) -> Result<Option<Reservation>> {
        let row = sqlx::query(&format!("{} WHERE id = $1", SELECT_RESERVATIONS))
            .bind(reservation_id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_reservation).transpose()
    }

    async fn find_by_user_id(&self, user_id: UserId) -> Result<Vec<Reservation>> {
        let rows = sqlx::query(&format!(
            "{} WHERE user_id = $1 ORDER BY id ASC",
            SELECT_RESERVATIONS
        ))
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_reservation).collect()
    }

    async fn find_by_status(&self, status: ReservationStatus) -> Result<Vec<Reservation>> {
        let rows = sqlx::query(&format!(
            "{} WHERE status = $1 ORDER BY id ASC",
            SELECT_RESERVATIONS
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_reservation).collect()
    }

    /// (status, expected_return_date)のインデックスを使用する
    async fn find_by_status_and_expected_return_date_before(
        &self,
        status: ReservationStatus,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>> {
        let rows = sqlx::query(&format!(
            "{} WHERE status = $1 AND expected_return_date < $2 ORDER BY id ASC",
            SELECT_RESERVATIONS
        ))
        .bind(status.as_str())
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_reservation).collect()
    }

    async fn find_all(&self) -> Result<Vec<Reservation>> {
        let rows = sqlx::query(&format!("{} ORDER BY id ASC", SELECT_RESERVATIONS))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_row_to_reservation).collect()
    }
}
