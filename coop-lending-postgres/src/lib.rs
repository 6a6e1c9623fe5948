pub mod executor;
pub mod postgres_repositories;
pub mod repository;
pub mod utils;

pub use executor::Executor;
pub use postgres_repositories::{PostgresLendingSession, PostgresLendingStore};
pub use repository::lending::{LedgerRepositoryImpl, LoanRepositoryImpl, MemberRepositoryImpl};

#[cfg(test)]
pub mod test_helper;
