//! SQLite persistence adapters

mod connection;
mod dice_repository;
mod session_repository;

pub use connection::SqliteConnection;
pub use dice_repository::SqliteDiceRepository;
pub use session_repository::SqliteSessionRepository;
