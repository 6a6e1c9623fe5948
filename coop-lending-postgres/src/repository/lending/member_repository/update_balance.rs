use rust_decimal::Decimal;
use uuid::Uuid;

use coop_lending_db::repository::error::{RepositoryError, RepositoryResult};

use super::repo_impl::MemberRepositoryImpl;

impl MemberRepositoryImpl {
    pub(super) async fn update_balance_impl(
        repo: &MemberRepositoryImpl,
        id: Uuid,
        balance: Decimal,
    ) -> RepositoryResult<()> {
        let mut tx = repo.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or(RepositoryError::TransactionConsumed)?;

        let result = sqlx::query("UPDATE member SET balance = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(balance)
            .execute(&mut **transaction)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("member {id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use coop_lending_db::repository::error::RepositoryError;
    use coop_lending_db::repository::member_repository::MemberRepository;
    use rust_decimal_macros::dec;
    use serial_test::serial;
    use uuid::Uuid;

    use super::super::test_utils::test_utils::{create_test_member, unique_phone};
    use crate::test_helper::setup_test_context;

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_update_member_balance() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let member = ctx
            .session
            .create_member(create_test_member(&unique_phone(), dec!(10)))
            .await?;

        ctx.session.update_member_balance(member.id, dec!(1234.5678)).await?;
        let reloaded = ctx.session.find_member_by_id(member.id).await?;
        assert_eq!(reloaded.map(|m| m.balance), Some(dec!(1234.5678)));

        let missing = ctx.session.update_member_balance(Uuid::new_v4(), dec!(1)).await;
        assert!(matches!(missing, Err(RepositoryError::NotFound(_))));

        Ok(())
    }
}
