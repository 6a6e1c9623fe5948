use uuid::Uuid;

use coop_lending_db::models::loan::LoanModel;
use coop_lending_db::repository::error::{RepositoryError, RepositoryResult};

use super::repo_impl::LoanRepositoryImpl;

impl LoanRepositoryImpl {
    pub(super) async fn find_by_member_impl(
        repo: &LoanRepositoryImpl,
        member_id: Uuid,
    ) -> RepositoryResult<Vec<LoanModel>> {
        let mut tx = repo.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or(RepositoryError::TransactionConsumed)?;

        let rows = sqlx::query(
            "SELECT * FROM loan WHERE member_id = $1 ORDER BY created_at DESC, sequence_number DESC",
        )
        .bind(member_id)
        .fetch_all(&mut **transaction)
        .await?;
        Self::load_loans(&mut **transaction, &rows).await
    }
}
