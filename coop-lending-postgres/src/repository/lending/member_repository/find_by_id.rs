use uuid::Uuid;

use coop_lending_db::models::member::MemberModel;
use coop_lending_db::repository::error::{RepositoryError, RepositoryResult};

use super::repo_impl::MemberRepositoryImpl;
use crate::utils::TryFromRow;

impl MemberRepositoryImpl {
    /// Loads the member and holds its row lock until the transaction ends.
    pub(super) async fn find_by_id_impl(
        repo: &MemberRepositoryImpl,
        id: Uuid,
    ) -> RepositoryResult<Option<MemberModel>> {
        let row = {
            let mut tx = repo.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or(RepositoryError::TransactionConsumed)?;
            sqlx::query("SELECT * FROM member WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut **transaction)
                .await?
        };

        row.map(|row| MemberModel::try_from_row(&row).map_err(RepositoryError::Backend))
            .transpose()
    }
}
