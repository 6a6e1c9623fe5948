pub mod repo_impl;
pub mod create;
pub mod find_by_id;
pub mod find_by_phone_numbers;
pub mod update_balance;

#[cfg(test)]
pub mod test_utils;

pub use repo_impl::MemberRepositoryImpl;
