use coop_lending_db::models::member::MemberModel;
use coop_lending_db::repository::error::{RepositoryError, RepositoryResult};

use super::repo_impl::MemberRepositoryImpl;

impl MemberRepositoryImpl {
    pub(super) async fn create_impl(
        repo: &MemberRepositoryImpl,
        member: MemberModel,
    ) -> RepositoryResult<MemberModel> {
        let phone_number_hash = member.phone_number_hash()?;

        let mut tx = repo.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or(RepositoryError::TransactionConsumed)?;

        sqlx::query(
            r#"
            INSERT INTO member (id, display_name, phone_number, phone_number_hash, balance, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(member.id)
        .bind(member.display_name.as_str())
        .bind(member.phone_number.as_str())
        .bind(phone_number_hash)
        .bind(member.balance)
        .bind(member.created_at)
        .bind(member.updated_at)
        .execute(&mut **transaction)
        .await?;

        Ok(member)
    }
}
