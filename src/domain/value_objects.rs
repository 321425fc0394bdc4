use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 予約ID - 予約管理コンテキストの集約ID
///
/// 永続化時にストアが採番する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReservationId(i64);

impl ReservationId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 利用者ID - 利用者ディレクトリへの参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(i64);

impl UserId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 外部カタログ上の書籍ID - 書籍ディレクトリへの参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BookExternalId(i64);

impl BookExternalId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for BookExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 貸出日数エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RentalDaysError {
    /// 1日未満
    NotPositive(i64),
    /// 表現可能な範囲を超えている
    OutOfRange(i64),
}

impl fmt::Display for RentalDaysError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RentalDaysError::NotPositive(days) => {
                write!(f, "rental days must be positive, got {}", days)
            }
            RentalDaysError::OutOfRange(days) => {
                write!(f, "rental days out of range: {}", days)
            }
        }
    }
}

/// 貸出日数
///
/// 不変条件：1以上。
/// 型システムでこの制約を強制し、0や負の日数を持つ予約を作成できないようにする。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct RentalDays(u32);

impl RentalDays {
    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn as_i64(&self) -> i64 {
        i64::from(self.0)
    }
}

impl TryFrom<i64> for RentalDays {
    type Error = RentalDaysError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value <= 0 {
            return Err(RentalDaysError::NotPositive(value));
        }
        u32::try_from(value)
            .map(Self)
            .map_err(|_| RentalDaysError::OutOfRange(value))
    }
}

impl From<RentalDays> for i64 {
    fn from(days: RentalDays) -> Self {
        days.as_i64()
    }
}

/// 金額
///
/// 不変条件：小数点以下ちょうど2桁（四捨五入）。
/// 生成時・演算時に必ず丸めるため、丸め前の値が外に漏れることはない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// 小数点以下2桁
    pub const SCALE: u32 = 2;

    /// 扱える金額の上限（絶対値）：9,999,999,999.99
    ///
    /// 永続化先のNUMERIC(12,2)に収まる最大値。
    pub const MAX: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

    pub fn new(amount: Decimal) -> Self {
        Self(round_half_up(amount))
    }

    pub fn zero() -> Self {
        Self::new(Decimal::ZERO)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// 上限を超える金額は`None`
    pub fn checked_new(amount: Decimal) -> Option<Self> {
        if amount.abs() > Self::MAX {
            return None;
        }
        Some(Self::new(amount)).filter(|money| money.0.abs() <= Self::MAX)
    }

    /// 加算。結果が上限を超える場合は`None`
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).and_then(Self::checked_new)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 小数点以下2桁に四捨五入し、スケールを2に揃える
fn round_half_up(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(Money::SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(Money::SCALE);
    rounded
}
