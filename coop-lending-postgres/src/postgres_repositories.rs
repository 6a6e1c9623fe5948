use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use coop_lending_db::models::ledger_entry::LedgerEntryModel;
use coop_lending_db::models::loan::{LoanModel, LoanStatus};
use coop_lending_db::models::member::MemberModel;
use coop_lending_db::repository::error::RepositoryResult;
use coop_lending_db::repository::ledger_repository::LedgerRepository;
use coop_lending_db::repository::loan_repository::LoanRepository;
use coop_lending_db::repository::member_repository::MemberRepository;
use coop_lending_db::repository::pagination::{Page, PageRequest};
use coop_lending_db::repository::unit_of_work::{LendingStore, UnitOfWork};

use crate::executor::Executor;
use crate::repository::lending::{LedgerRepositoryImpl, LoanRepositoryImpl, MemberRepositoryImpl};

/// PostgreSQL-backed [`LendingStore`]: every session is one database
/// transaction shared by the member, loan and ledger repositories.
#[derive(Clone)]
pub struct PostgresLendingStore {
    pool: Arc<PgPool>,
}

impl PostgresLendingStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl LendingStore for PostgresLendingStore {
    type Session = PostgresLendingSession;

    async fn begin(&self) -> RepositoryResult<Self::Session> {
        let tx = self.pool.begin().await?;
        debug!("Lending transaction started");
        Ok(PostgresLendingSession::new(Executor::new(tx)))
    }
}

pub struct PostgresLendingSession {
    executor: Executor,
    pub member_repository: MemberRepositoryImpl,
    pub loan_repository: LoanRepositoryImpl,
    pub ledger_repository: LedgerRepositoryImpl,
}

impl PostgresLendingSession {
    pub fn new(executor: Executor) -> Self {
        Self {
            member_repository: MemberRepositoryImpl::new(executor.clone()),
            loan_repository: LoanRepositoryImpl::new(executor.clone()),
            ledger_repository: LedgerRepositoryImpl::new(executor.clone()),
            executor,
        }
    }
}

#[async_trait]
impl MemberRepository for PostgresLendingSession {
    async fn create_member(&self, member: MemberModel) -> RepositoryResult<MemberModel> {
        self.member_repository.create_member(member).await
    }

    async fn find_member_by_id(&self, id: Uuid) -> RepositoryResult<Option<MemberModel>> {
        self.member_repository.find_member_by_id(id).await
    }

    async fn find_members_by_phone_numbers(
        &self,
        phone_numbers: &[String],
    ) -> RepositoryResult<Vec<MemberModel>> {
        self.member_repository
            .find_members_by_phone_numbers(phone_numbers)
            .await
    }

    async fn update_member_balance(&self, id: Uuid, balance: Decimal) -> RepositoryResult<()> {
        self.member_repository.update_member_balance(id, balance).await
    }
}

#[async_trait]
impl LoanRepository for PostgresLendingSession {
    async fn create_loan(&self, loan: LoanModel) -> RepositoryResult<LoanModel> {
        self.loan_repository.create_loan(loan).await
    }

    async fn update_loan(&self, loan: LoanModel) -> RepositoryResult<LoanModel> {
        self.loan_repository.update_loan(loan).await
    }

    async fn find_loan_by_id(&self, id: Uuid) -> RepositoryResult<Option<LoanModel>> {
        self.loan_repository.find_loan_by_id(id).await
    }

    async fn find_open_loan_by_member(
        &self,
        member_id: Uuid,
    ) -> RepositoryResult<Option<LoanModel>> {
        self.loan_repository.find_open_loan_by_member(member_id).await
    }

    async fn find_loans_by_member(&self, member_id: Uuid) -> RepositoryResult<Vec<LoanModel>> {
        self.loan_repository.find_loans_by_member(member_id).await
    }

    async fn find_loans_awaiting_surety(
        &self,
        surety_member_id: Uuid,
    ) -> RepositoryResult<Vec<LoanModel>> {
        self.loan_repository
            .find_loans_awaiting_surety(surety_member_id)
            .await
    }

    async fn find_loans_by_status(
        &self,
        status: Option<LoanStatus>,
        page: PageRequest,
    ) -> RepositoryResult<Page<LoanModel>> {
        self.loan_repository.find_loans_by_status(status, page).await
    }
}

#[async_trait]
impl LedgerRepository for PostgresLendingSession {
    async fn append_ledger_entry(
        &self,
        entry: LedgerEntryModel,
    ) -> RepositoryResult<LedgerEntryModel> {
        self.ledger_repository.append_ledger_entry(entry).await
    }

    async fn find_ledger_entry_by_reference(
        &self,
        reference: &str,
    ) -> RepositoryResult<Option<LedgerEntryModel>> {
        self.ledger_repository
            .find_ledger_entry_by_reference(reference)
            .await
    }

    async fn find_ledger_entries_by_member(
        &self,
        member_id: Uuid,
    ) -> RepositoryResult<Vec<LedgerEntryModel>> {
        self.ledger_repository
            .find_ledger_entries_by_member(member_id)
            .await
    }
}

#[async_trait]
impl UnitOfWork for PostgresLendingSession {
    async fn commit(self) -> RepositoryResult<()> {
        self.executor.commit().await
    }

    async fn rollback(self) -> RepositoryResult<()> {
        self.executor.rollback().await
    }
}
