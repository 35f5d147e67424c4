//! Lightbox Storage Layer
//!
//! SQLite-backed catalog for the local media library and host settings.

mod database;
mod error;
mod migrations;

pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
