pub mod book_directory;
pub mod user_directory;

pub use book_directory::BookDirectory;
pub use user_directory::UserDirectory;
