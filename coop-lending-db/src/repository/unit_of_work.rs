use async_trait::async_trait;

use crate::repository::error::RepositoryResult;
use crate::repository::ledger_repository::LedgerRepository;
use crate::repository::loan_repository::LoanRepository;
use crate::repository::member_repository::MemberRepository;

/// A set of repositories sharing one transaction.
///
/// Nothing written through a unit of work is visible to other units of work
/// before `commit`. Dropping or rolling back discards every write.
#[async_trait]
pub trait UnitOfWork: MemberRepository + LoanRepository + LedgerRepository {
    async fn commit(self) -> RepositoryResult<()>;

    async fn rollback(self) -> RepositoryResult<()>;
}

/// Entry point to a lending store: hands out units of work.
#[async_trait]
pub trait LendingStore: Send + Sync {
    type Session: UnitOfWork + Send;

    async fn begin(&self) -> RepositoryResult<Self::Session>;
}
