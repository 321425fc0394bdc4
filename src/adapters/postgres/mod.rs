pub mod reservation_store;

// パブリックに型を再エクスポート
pub use reservation_store::ReservationStore as PostgresReservationStore;
