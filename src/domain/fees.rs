//! 料金計算
//!
//! すべて副作用のない純粋関数。結果は常に小数点以下2桁に四捨五入される。
//! 結果が`Money::MAX`を超える場合は`FeeOutOfRange`を返す。

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{FeeOutOfRange, Money};

/// 延滞料率：書籍価格の15%／日
pub const LATE_FEE_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

/// 基本貸出料金 = 日額 × 貸出日数
///
/// 日額・日数が欠けている場合、または日数が0以下の場合は0.00。
pub fn compute_base_fee(
    daily_rate: Option<Money>,
    rental_days: Option<i64>,
) -> Result<Money, FeeOutOfRange> {
    match (daily_rate, rental_days) {
        (Some(rate), Some(days)) if days > 0 => {
            bounded(rate.value().checked_mul(Decimal::from(days)))
        }
        _ => Ok(Money::zero()),
    }
}

/// 延滞料金 = 書籍価格 × 延滞料率 × 延滞日数
///
/// 書籍価格が欠けている場合、または延滞日数が0以下の場合は0.00。
pub fn compute_late_fee(
    book_price: Option<Money>,
    days_late: i64,
) -> Result<Money, FeeOutOfRange> {
    match book_price {
        Some(price) if days_late > 0 => bounded(
            price
                .value()
                .checked_mul(LATE_FEE_RATE)
                .and_then(|per_day| per_day.checked_mul(Decimal::from(days_late))),
        ),
        _ => Ok(Money::zero()),
    }
}

fn bounded(amount: Option<Decimal>) -> Result<Money, FeeOutOfRange> {
    amount.and_then(Money::checked_new).ok_or(FeeOutOfRange)
}

/// 延滞日数
///
/// 実返却日が返却予定日より厳密に後の場合のみ、その日数差を返す。
pub fn days_late(expected: Option<NaiveDate>, actual: Option<NaiveDate>) -> i64 {
    match (expected, actual) {
        (Some(expected), Some(actual)) if actual > expected => (actual - expected).num_days(),
        _ => 0,
    }
}
