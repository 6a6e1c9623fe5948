pub mod error;
pub mod ledger_repository;
pub mod loan_repository;
pub mod member_repository;
pub mod memory;
pub mod pagination;
pub mod unit_of_work;

// Re-exports
pub use error::*;
pub use ledger_repository::*;
pub use loan_repository::*;
pub use member_repository::*;
pub use memory::InMemoryLendingStore;
pub use pagination::*;
pub use unit_of_work::*;
