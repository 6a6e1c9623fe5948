use coop_lending_db::models::ledger_entry::LedgerEntryModel;
use coop_lending_db::repository::error::{RepositoryError, RepositoryResult};

use super::repo_impl::LedgerRepositoryImpl;
use crate::utils::TryFromRow;

impl LedgerRepositoryImpl {
    pub(super) async fn find_by_reference_impl(
        repo: &LedgerRepositoryImpl,
        reference: &str,
    ) -> RepositoryResult<Option<LedgerEntryModel>> {
        let row = {
            let mut tx = repo.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or(RepositoryError::TransactionConsumed)?;
            sqlx::query("SELECT * FROM ledger_entry WHERE reference = $1")
                .bind(reference)
                .fetch_optional(&mut **transaction)
                .await?
        };

        row.map(|row| LedgerEntryModel::try_from_row(&row).map_err(RepositoryError::Backend))
            .transpose()
    }
}
