#![forbid(unsafe_code)]

pub mod repository;
pub mod sheets;
pub mod sqlite;

pub use repository::{SessionRecord, SessionRepository, SheetSource, Storage, StorageError};
