use coop_lending_db::models::loan::{LoanModel, LoanStatus};
use coop_lending_db::repository::error::{RepositoryError, RepositoryResult};
use coop_lending_db::repository::pagination::{Page, PageRequest};

use super::repo_impl::LoanRepositoryImpl;

impl LoanRepositoryImpl {
    pub(super) async fn find_by_status_impl(
        repo: &LoanRepositoryImpl,
        status: Option<LoanStatus>,
        page: PageRequest,
    ) -> RepositoryResult<Page<LoanModel>> {
        let limit = i64::try_from(page.limit).map_err(|_| format!("Page size {} too large", page.limit))?;
        let offset = i64::try_from(page.offset).map_err(|_| format!("Offset {} too large", page.offset))?;

        let mut tx = repo.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or(RepositoryError::TransactionConsumed)?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loan WHERE ($1::loan_status IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&mut **transaction)
        .await?;

        let rows = sqlx::query(
            r#"
            SELECT * FROM loan
            WHERE ($1::loan_status IS NULL OR status = $1)
            ORDER BY created_at DESC, sequence_number DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut **transaction)
        .await?;
        let loans = Self::load_loans(&mut **transaction, &rows).await?;

        Ok(Page::new(
            loans,
            usize::try_from(total).unwrap_or_default(),
            page.limit,
            page.offset,
        ))
    }
}

#[cfg(test)]
mod tests {
    use coop_lending_db::models::loan::LoanStatus;
    use coop_lending_db::repository::loan_repository::LoanRepository;
    use coop_lending_db::repository::pagination::PageRequest;
    use serial_test::serial;

    use super::super::test_utils::test_utils::{create_borrower_and_sureties, create_test_loan};
    use crate::test_helper::setup_test_context;

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_find_loans_by_status_pages() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let before = ctx
            .session
            .find_loans_by_status(Some(LoanStatus::Rejected), PageRequest::new(1, 0))
            .await?
            .total;

        let (borrower, sureties) = create_borrower_and_sureties(&ctx.session, 1).await?;
        for _ in 0..3 {
            ctx.session
                .create_loan(create_test_loan(borrower.id, &sureties, LoanStatus::Rejected))
                .await?;
        }

        let page = ctx
            .session
            .find_loans_by_status(Some(LoanStatus::Rejected), PageRequest::new(2, 0))
            .await?;
        assert_eq!(page.total, before + 3);
        assert_eq!(page.items.len(), 2);
        assert!(page.items.iter().all(|l| l.status == LoanStatus::Rejected));

        let all = ctx.session.find_loans_by_status(None, PageRequest::new(1, 0)).await?;
        assert!(all.total >= page.total);

        Ok(())
    }
}
