use serde::{Deserialize, Serialize};

use super::{BookExternalId, Money, UserId};

/// 利用者（利用者ディレクトリの参照コピー）
///
/// 正本は利用者ディレクトリにあり、予約コンテキストは読み取るだけ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// カタログ上の書籍（書籍ディレクトリからの射影）
///
/// 予約作成時の一時的なスナップショットとしてのみ使用する。
/// 在庫数の正本は書籍ディレクトリにある。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogBook {
    pub external_id: BookExternalId,
    pub title: String,
    pub author_names: Vec<String>,
    /// 1日あたりの貸出料金
    pub price: Money,
    pub available_quantity: i32,
    pub first_publish_year: Option<i32>,
    pub has_fulltext: bool,
}

impl CatalogBook {
    /// 予約可能か（在庫が1冊以上あるか）
    pub fn is_available(&self) -> bool {
        self.available_quantity > 0
    }
}
