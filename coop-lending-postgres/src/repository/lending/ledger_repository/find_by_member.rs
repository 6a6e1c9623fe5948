use uuid::Uuid;

use coop_lending_db::models::ledger_entry::LedgerEntryModel;
use coop_lending_db::repository::error::{RepositoryError, RepositoryResult};

use super::repo_impl::LedgerRepositoryImpl;
use crate::utils::rows_into;

impl LedgerRepositoryImpl {
    pub(super) async fn find_by_member_impl(
        repo: &LedgerRepositoryImpl,
        member_id: Uuid,
    ) -> RepositoryResult<Vec<LedgerEntryModel>> {
        let rows = {
            let mut tx = repo.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or(RepositoryError::TransactionConsumed)?;
            sqlx::query("SELECT * FROM ledger_entry WHERE member_id = $1 ORDER BY sequence_number")
                .bind(member_id)
                .fetch_all(&mut **transaction)
                .await?
        };
        rows_into(&rows)
    }
}
