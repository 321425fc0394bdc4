use crate::domain::{User, UserId};
use crate::ports::user_directory::{Result, UserDirectory as UserDirectoryTrait};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// UserDirectoryのモック実装
///
/// 利用者をメモリ上に保存することで状態を持ったテストをサポート。
pub struct UserDirectory {
    users: Mutex<HashMap<UserId, User>>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }

    /// テスト用に利用者を登録
    pub fn add_user(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserDirectoryTrait for UserDirectory {
    async fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
        Ok(self.users.lock().unwrap().get(&user_id).cloned())
    }
}
