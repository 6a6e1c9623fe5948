use async_trait::async_trait;
use sqlx::{postgres::PgRow, Row};
use std::error::Error;
use uuid::Uuid;

use coop_lending_db::models::ledger_entry::LedgerEntryModel;
use coop_lending_db::repository::error::RepositoryResult;
use coop_lending_db::repository::ledger_repository::LedgerRepository;

use crate::executor::Executor;
use crate::utils::{get_heapless_string, get_optional_heapless_string, TryFromRow};

pub struct LedgerRepositoryImpl {
    pub executor: Executor,
}

impl LedgerRepositoryImpl {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

impl TryFromRow<PgRow> for LedgerEntryModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(LedgerEntryModel {
            id: row.try_get("id")?,
            member_id: row.try_get("member_id")?,
            loan_id: row.try_get("loan_id")?,
            transaction_type: row.try_get("transaction_type")?,
            amount: row.try_get("amount")?,
            description: get_heapless_string(row, "description")?,
            reference: get_optional_heapless_string(row, "reference")?,
            balance_before: row.try_get("balance_before")?,
            balance_after: row.try_get("balance_after")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl LedgerRepository for LedgerRepositoryImpl {
    async fn append_ledger_entry(
        &self,
        entry: LedgerEntryModel,
    ) -> RepositoryResult<LedgerEntryModel> {
        Self::append_impl(self, entry).await
    }

    async fn find_ledger_entry_by_reference(
        &self,
        reference: &str,
    ) -> RepositoryResult<Option<LedgerEntryModel>> {
        Self::find_by_reference_impl(self, reference).await
    }

    async fn find_ledger_entries_by_member(
        &self,
        member_id: Uuid,
    ) -> RepositoryResult<Vec<LedgerEntryModel>> {
        Self::find_by_member_impl(self, member_id).await
    }
}
