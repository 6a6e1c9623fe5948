use uuid::Uuid;

use coop_lending_db::models::loan::LoanModel;
use coop_lending_db::repository::error::{RepositoryError, RepositoryResult};

use super::repo_impl::LoanRepositoryImpl;

impl LoanRepositoryImpl {
    pub(super) async fn find_open_by_member_impl(
        repo: &LoanRepositoryImpl,
        member_id: Uuid,
    ) -> RepositoryResult<Option<LoanModel>> {
        let mut tx = repo.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or(RepositoryError::TransactionConsumed)?;

        let rows = sqlx::query(
            "SELECT * FROM loan WHERE member_id = $1 AND status IN ('approved', 'active')",
        )
        .bind(member_id)
        .fetch_all(&mut **transaction)
        .await?;
        let loans = Self::load_loans(&mut **transaction, &rows).await?;
        Ok(loans.into_iter().next())
    }
}
