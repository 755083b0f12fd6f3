//! SQLite persistence for the costs engine
//!
//! One repository per port defined in `costclose-core`. Every repository
//! shares the same [`DbManager`] and runs its statements on the blocking
//! thread pool.

pub mod closing_repository;
pub mod columns;
pub mod inputs_repository;
pub mod manager;
pub mod overhead_repository;
pub mod salary_repository;

pub use closing_repository::SqliteClosingRepository;
pub use inputs_repository::SqliteCostInputsRepository;
pub use manager::DbManager;
pub use overhead_repository::SqliteOverheadRepository;
pub use salary_repository::SqliteSalaryRepository;
