use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{
    BookExternalId, CatalogBook, CreateReservationError, FeeOutOfRange, Money, RentalDays,
    RentalDaysError, ReservationId, ReturnBookError, User, UserId, fees,
};

/// 予約時点の書籍スナップショット
///
/// カタログ上の書籍への参照ではなく値として保持する。
/// 予約後にカタログの価格が変わっても、過去の料金計算には影響しない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub external_id: BookExternalId,
    pub title: String,
    pub author_names: Vec<String>,
    pub price: Money,
}

impl BookSnapshot {
    pub fn from_catalog(book: &CatalogBook) -> Self {
        Self {
            external_id: book.external_id,
            title: book.title.clone(),
            author_names: book.author_names.clone(),
            price: book.price,
        }
    }
}

/// 予約作成時に確定し、以後変更されない条件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationTerms {
    pub user_id: UserId,
    pub user_name: String,
    pub book: BookSnapshot,
    pub rental_days: RentalDays,
    pub daily_rate: Money,
    pub start_date: NaiveDate,
    pub expected_return_date: NaiveDate,
}

impl ReservationTerms {
    /// 基本料金（日額 × 貸出日数）
    pub fn base_fee(&self) -> Result<Money, FeeOutOfRange> {
        fees::compute_base_fee(Some(self.daily_rate), Some(self.rental_days.as_i64()))
    }
}

/// 永続化前の予約
///
/// IDと作成日時はストアが採番する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReservation {
    pub terms: ReservationTerms,
    pub total_fee: Money,
}

// ============================================================================
// 型安全な状態パターン
// ============================================================================

/// Reservation集約の共通フィールド
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationCore {
    pub reservation_id: ReservationId,
    #[serde(flatten)]
    pub terms: ReservationTerms,
    pub total_fee: Money,
    pub created_at: DateTime<Utc>,
}

impl std::ops::Deref for ReservationCore {
    type Target = ReservationTerms;

    fn deref(&self) -> &Self::Target {
        &self.terms
    }
}

/// 貸出中状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveReservation {
    #[serde(flatten)]
    pub core: ReservationCore,
}

impl std::ops::Deref for ActiveReservation {
    type Target = ReservationCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

/// 返却済み状態
///
/// ビジネスルール：
/// - actual_return_dateとlate_feeが必須（型で保証）
/// - 終端状態。以後の遷移はない
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnedReservation {
    #[serde(flatten)]
    pub core: ReservationCore,
    pub actual_return_date: NaiveDate,
    pub late_fee: Money,
}

impl std::ops::Deref for ReturnedReservation {
    type Target = ReservationCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

/// 予約ステータス（クエリ用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    /// 貸出中
    Active,
    /// 返却済み
    Returned,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Active => "ACTIVE",
            ReservationStatus::Returned => "RETURNED",
        }
    }
}

impl std::str::FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(ReservationStatus::Active),
            "RETURNED" => Ok(ReservationStatus::Returned),
            _ => Err(format!("Invalid reservation status: {}", s)),
        }
    }
}

/// Reservation集約の統合型
///
/// 「返却済みなのに返却日がない」といった状態は表現できない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reservation {
    Active(ActiveReservation),
    Returned(ReturnedReservation),
}

impl Reservation {
    pub fn core(&self) -> &ReservationCore {
        match self {
            Reservation::Active(active) => &active.core,
            Reservation::Returned(returned) => &returned.core,
        }
    }

    pub fn id(&self) -> ReservationId {
        self.core().reservation_id
    }

    pub fn status(&self) -> ReservationStatus {
        match self {
            Reservation::Active(_) => ReservationStatus::Active,
            Reservation::Returned(_) => ReservationStatus::Returned,
        }
    }

    pub fn actual_return_date(&self) -> Option<NaiveDate> {
        match self {
            Reservation::Active(_) => None,
            Reservation::Returned(returned) => Some(returned.actual_return_date),
        }
    }

    /// 延滞料金（貸出中は0.00）
    pub fn late_fee(&self) -> Money {
        match self {
            Reservation::Active(_) => Money::zero(),
            Reservation::Returned(returned) => returned.late_fee,
        }
    }
}

impl From<ActiveReservation> for Reservation {
    fn from(active: ActiveReservation) -> Self {
        Reservation::Active(active)
    }
}

impl From<ReturnedReservation> for Reservation {
    fn from(returned: ReturnedReservation) -> Self {
        Reservation::Returned(returned)
    }
}

/// 純粋関数：書籍を予約する
///
/// ビジネスルール：
/// - 在庫が1冊以上あること
/// - 返却予定日 = 開始日 + 貸出日数
/// - 日額は予約時点の書籍価格
/// - 合計料金は基本料金のみ（上限を超える場合は予約不可）
///
/// 副作用なし。永続化前の予約を返す。
pub fn open_reservation(
    user: &User,
    book: &CatalogBook,
    start_date: NaiveDate,
    rental_days: RentalDays,
) -> Result<NewReservation, CreateReservationError> {
    if !book.is_available() {
        return Err(CreateReservationError::BookNotAvailable(book.external_id));
    }

    let expected_return_date = start_date
        .checked_add_days(Days::new(u64::from(rental_days.value())))
        .ok_or(RentalDaysError::OutOfRange(rental_days.as_i64()))?;

    let book = BookSnapshot::from_catalog(book);
    let terms = ReservationTerms {
        user_id: user.id,
        user_name: user.name.clone(),
        daily_rate: book.price,
        book,
        rental_days,
        start_date,
        expected_return_date,
    };
    let total_fee = terms.base_fee()?;

    Ok(NewReservation { terms, total_fee })
}

/// 純粋関数：書籍を返却する
///
/// ビジネスルール：
/// - 貸出中の予約のみ返却できる
/// - 延滞料金は予約時点の書籍価格から計算する
/// - 合計料金 = 基本料金 + 延滞料金（スナップショットから再計算）
/// - 合計料金が上限を超える場合は返却不可
///
/// 副作用なし。返却済みの予約を返す。
pub fn return_reservation(
    reservation: Reservation,
    actual_return_date: NaiveDate,
) -> Result<ReturnedReservation, ReturnBookError> {
    let active = match reservation {
        Reservation::Active(active) => active,
        Reservation::Returned(_) => return Err(ReturnBookError::AlreadyReturned),
    };

    let days_late = fees::days_late(Some(active.expected_return_date), Some(actual_return_date));
    let late_fee = fees::compute_late_fee(Some(active.book.price), days_late)?;
    let total_fee = active
        .base_fee()?
        .checked_add(late_fee)
        .ok_or(ReturnBookError::FeeOutOfRange)?;

    Ok(ReturnedReservation {
        core: ReservationCore {
            total_fee,
            ..active.core
        },
        actual_return_date,
        late_fee,
    })
}
