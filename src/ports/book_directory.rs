use crate::domain::{BookExternalId, CatalogBook};
use async_trait::async_trait;
use thiserror::Error;

/// 書籍ディレクトリのエラー
#[derive(Debug, Error)]
pub enum BookDirectoryError {
    /// 対象の書籍がカタログに存在しない
    #[error("Book {0} not found in catalog")]
    NotFound(BookExternalId),

    /// ディレクトリ自体の障害
    #[error("Book directory unavailable")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, BookDirectoryError>;

/// 書籍ディレクトリポート
///
/// 予約コンテキストとカタログコンテキストの境界を維持する。
/// 在庫数の正本はカタログ側にあり、予約コンテキストは増減を依頼するだけ。
///
/// 在庫の増減は冪等ではない。呼び出し側が1回の状態遷移につき
/// 高々1回しか呼ばないことを保証する。
#[async_trait]
pub trait BookDirectory: Send + Sync {
    /// 外部カタログIDで書籍を取得する
    ///
    /// 存在しない場合は`None`を返す。
    async fn get_book_by_external_id(
        &self,
        external_id: BookExternalId,
    ) -> Result<Option<CatalogBook>>;

    /// 在庫数を1減らす
    ///
    /// 書籍が存在しない場合は`BookDirectoryError::NotFound`。
    async fn decrease_available_quantity(&self, external_id: BookExternalId) -> Result<()>;

    /// 在庫数を1増やす
    ///
    /// 書籍が存在しない場合は`BookDirectoryError::NotFound`。
    async fn increase_available_quantity(&self, external_id: BookExternalId) -> Result<()>;
}
