//! Test helpers shared by crates that talk to SQLite.

pub mod database;

pub use database::SqliteTestDatabase;
