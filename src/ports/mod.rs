pub mod book_directory;
pub mod reservation_store;
pub mod user_directory;

pub use book_directory::{BookDirectory, BookDirectoryError};
pub use reservation_store::ReservationStore;
pub use user_directory::UserDirectory;
