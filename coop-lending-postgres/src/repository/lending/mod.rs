pub mod ledger_repository;
pub mod loan_repository;
pub mod member_repository;

pub use ledger_repository::LedgerRepositoryImpl;
pub use loan_repository::LoanRepositoryImpl;
pub use member_repository::MemberRepositoryImpl;
