pub mod repo_impl;
pub mod create;
pub mod update;
pub mod find_by_id;
pub mod find_open_by_member;
pub mod find_by_member;
pub mod find_awaiting_surety;
pub mod find_by_status;

#[cfg(test)]
pub mod test_utils;

pub use repo_impl::LoanRepositoryImpl;
