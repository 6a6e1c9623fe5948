pub mod repo_impl;
pub mod append;
pub mod find_by_reference;
pub mod find_by_member;

pub use repo_impl::LedgerRepositoryImpl;
