use heapless::String as HeaplessString;
use uuid::Uuid;

use coop_lending_db::models::ledger_entry::LedgerEntryModel;
use coop_lending_db::repository::error::{RepositoryError, RepositoryResult};

use super::repo_impl::LedgerRepositoryImpl;
use crate::utils::unique_violation;

const REFERENCE_CONSTRAINT: &str = "ledger_entry_reference_key";

impl LedgerRepositoryImpl {
    pub(super) async fn append_impl(
        repo: &LedgerRepositoryImpl,
        mut entry: LedgerEntryModel,
    ) -> RepositoryResult<LedgerEntryModel> {
        let reference = match entry.reference.take() {
            Some(reference) => reference,
            None => HeaplessString::try_from(format!("TXN-{}", Uuid::new_v4().simple()).as_str())
                .map_err(|_| "Generated reference does not fit".to_string())?,
        };

        let mut tx = repo.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or(RepositoryError::TransactionConsumed)?;

        sqlx::query(
            r#"
            INSERT INTO ledger_entry (
                id, member_id, loan_id, transaction_type, amount, description, reference,
                balance_before, balance_after, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(entry.id)
        .bind(entry.member_id)
        .bind(entry.loan_id)
        .bind(entry.transaction_type)
        .bind(entry.amount)
        .bind(entry.description.as_str())
        .bind(reference.as_str())
        .bind(entry.balance_before)
        .bind(entry.balance_after)
        .bind(entry.status)
        .bind(entry.created_at)
        .execute(&mut **transaction)
        .await
        .map_err(|err| {
            if unique_violation(&err) == Some(REFERENCE_CONSTRAINT) {
                RepositoryError::DuplicateReference(reference.to_string())
            } else {
                err.into()
            }
        })?;

        entry.reference = Some(reference);
        Ok(entry)
    }
}
