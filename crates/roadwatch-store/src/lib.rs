//! SQLite-backed location memory

mod storage;

pub use storage::SqliteMemory;
