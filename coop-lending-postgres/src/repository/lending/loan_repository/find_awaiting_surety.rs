use uuid::Uuid;

use coop_lending_db::models::loan::LoanModel;
use coop_lending_db::repository::error::{RepositoryError, RepositoryResult};

use super::repo_impl::LoanRepositoryImpl;

impl LoanRepositoryImpl {
    pub(super) async fn find_awaiting_surety_impl(
        repo: &LoanRepositoryImpl,
        surety_member_id: Uuid,
    ) -> RepositoryResult<Vec<LoanModel>> {
        let mut tx = repo.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or(RepositoryError::TransactionConsumed)?;

        let rows = sqlx::query(
            r#"
            SELECT l.* FROM loan l
            JOIN loan_surety s ON s.loan_id = l.id
            WHERE s.member_id = $1 AND s.status = 'pending' AND l.status = 'pending'
            ORDER BY l.created_at DESC, l.sequence_number DESC
            "#,
        )
        .bind(surety_member_id)
        .fetch_all(&mut **transaction)
        .await?;
        Self::load_loans(&mut **transaction, &rows).await
    }
}

#[cfg(test)]
mod tests {
    use coop_lending_db::models::loan::LoanStatus;
    use coop_lending_db::models::surety::SuretyStatus;
    use coop_lending_db::repository::loan_repository::LoanRepository;
    use serial_test::serial;

    use super::super::test_utils::test_utils::{create_borrower_and_sureties, create_test_loan};
    use crate::test_helper::setup_test_context;

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_find_loans_awaiting_surety() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let (borrower, sureties) = create_borrower_and_sureties(&ctx.session, 2).await?;
        let loan = create_test_loan(borrower.id, &sureties, LoanStatus::Pending);
        ctx.session.create_loan(loan.clone()).await?;

        let waiting = ctx.session.find_loans_awaiting_surety(sureties[0].id).await?;
        assert_eq!(waiting.len(), 1);
        assert_eq!(waiting[0].sureties.len(), 2);

        let mut answered = loan.clone();
        answered.sureties[0].status = SuretyStatus::Approved;
        ctx.session.update_loan(answered).await?;
        assert!(ctx.session.find_loans_awaiting_surety(sureties[0].id).await?.is_empty());
        assert_eq!(ctx.session.find_loans_awaiting_surety(sureties[1].id).await?.len(), 1);

        Ok(())
    }
}
