use uuid::Uuid;

use coop_lending_db::models::loan::LoanModel;
use coop_lending_db::repository::error::{RepositoryError, RepositoryResult};

use super::repo_impl::LoanRepositoryImpl;

impl LoanRepositoryImpl {
    /// Loads the loan and holds its row lock until the transaction ends.
    pub(super) async fn find_by_id_impl(
        repo: &LoanRepositoryImpl,
        id: Uuid,
    ) -> RepositoryResult<Option<LoanModel>> {
        let mut tx = repo.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or(RepositoryError::TransactionConsumed)?;

        let rows = sqlx::query("SELECT * FROM loan WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_all(&mut **transaction)
            .await?;
        let loans = Self::load_loans(&mut **transaction, &rows).await?;
        Ok(loans.into_iter().next())
    }
}
