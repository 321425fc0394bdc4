use crate::domain::{User, UserId};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 利用者ディレクトリポート
///
/// 予約コンテキストと利用者管理コンテキストの境界を維持する。
/// 予約コンテキストは利用者を参照するだけで、作成・削除は行わない。
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// IDで利用者を取得する
    ///
    /// 存在しない場合は`None`を返す。
    async fn get_user(&self, user_id: UserId) -> Result<Option<User>>;
}
