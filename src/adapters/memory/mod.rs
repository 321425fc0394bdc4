pub mod reservation_store;

pub use reservation_store::ReservationStore as InMemoryReservationStore;
