use crate::domain::{BookExternalId, CatalogBook, Money};
use crate::ports::book_directory::{
    BookDirectory as BookDirectoryTrait, BookDirectoryError, Result,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// BookDirectoryのモック実装
///
/// 書籍カタログと在庫数をメモリ上に保持する。
/// 在庫の増減呼び出し回数を記録する。
pub struct BookDirectory {
    books: Mutex<HashMap<BookExternalId, CatalogBook>>,
    decrease_calls: AtomicUsize,
    increase_calls: AtomicUsize,
}

impl BookDirectory {
    pub fn new() -> Self {
        Self {
            books: Mutex::new(HashMap::new()),
            decrease_calls: AtomicUsize::new(0),
            increase_calls: AtomicUsize::new(0),
        }
    }

    /// テスト用に書籍を登録
    pub fn add_book(&self, book: CatalogBook) {
        self.books.lock().unwrap().insert(book.external_id, book);
    }

    /// カタログから書籍を削除
    pub fn remove_book(&self, external_id: BookExternalId) {
        self.books.lock().unwrap().remove(&external_id);
    }

    /// 登録済み書籍の価格を変更
    pub fn set_price(&self, external_id: BookExternalId, price: Money) {
        if let Some(book) = self.books.lock().unwrap().get_mut(&external_id) {
            book.price = price;
        }
    }

    /// 現在の在庫数（未登録なら`None`）
    pub fn available_quantity(&self, external_id: BookExternalId) -> Option<i32> {
        self.books
            .lock()
            .unwrap()
            .get(&external_id)
            .map(|book| book.available_quantity)
    }

    pub fn decrease_calls(&self) -> usize {
        self.decrease_calls.load(Ordering::SeqCst)
    }

    pub fn increase_calls(&self) -> usize {
        self.increase_calls.load(Ordering::SeqCst)
    }

    fn adjust(&self, external_id: BookExternalId, delta: i32) -> Result<()> {
        let mut books = self.books.lock().unwrap();
        let book = books
            .get_mut(&external_id)
            .ok_or(BookDirectoryError::NotFound(external_id))?;
        book.available_quantity += delta;
        Ok(())
    }
}

impl Default for BookDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookDirectoryTrait for BookDirectory {
    async fn get_book_by_external_id(
        &self,
        external_id: BookExternalId,
    ) -> Result<Option<CatalogBook>> {
        Ok(self.books.lock().unwrap().get(&external_id).cloned())
    }

    async fn decrease_available_quantity(&self, external_id: BookExternalId) -> Result<()> {
        self.decrease_calls.fetch_add(1, Ordering::SeqCst);
        self.adjust(external_id, -1)
    }

    async fn increase_available_quantity(&self, external_id: BookExternalId) -> Result<()> {
        self.increase_calls.fetch_add(1, Ordering::SeqCst);
        self.adjust(external_id, 1)
    }
}
