use coop_lending_db::models::loan::LoanModel;
use coop_lending_db::repository::error::{RepositoryError, RepositoryResult};

use super::repo_impl::LoanRepositoryImpl;

impl LoanRepositoryImpl {
    /// Writes status, activation fields and surety answers, and appends
    /// repayment entries past the stored history.
    pub(super) async fn update_impl(
        repo: &LoanRepositoryImpl,
        loan: LoanModel,
    ) -> RepositoryResult<LoanModel> {
        let mut tx = repo.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or(RepositoryError::TransactionConsumed)?;

        let result = sqlx::query(
            r#"
            UPDATE loan SET
                status = $2,
                start_date = $3,
                end_date = $4,
                monthly_payment = $5,
                total_interest = $6,
                total_repayment = $7,
                remaining_amount = $8,
                amount_paid = $9,
                next_payment_date = $10,
                approved_by = $11,
                approved_at = $12,
                updated_at = $13
            WHERE id = $1
            "#,
        )
        .bind(loan.id)
        .bind(loan.status)
        .bind(loan.start_date)
        .bind(loan.end_date)
        .bind(loan.monthly_payment)
        .bind(loan.total_interest)
        .bind(loan.total_repayment)
        .bind(loan.remaining_amount)
        .bind(loan.amount_paid)
        .bind(loan.next_payment_date)
        .bind(loan.approved_by)
        .bind(loan.approved_at)
        .bind(loan.updated_at)
        .execute(&mut **transaction)
        .await
        .map_err(|err| Self::map_write_error(err, loan.member_id))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("loan {}", loan.id)));
        }

        for surety in &loan.sureties {
            sqlx::query(
                "UPDATE loan_surety SET status = $3, responded_at = $4 WHERE loan_id = $1 AND member_id = $2",
            )
            .bind(loan.id)
            .bind(surety.member_id)
            .bind(surety.status)
            .bind(surety.responded_at)
            .execute(&mut **transaction)
            .await?;
        }

        let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loan_repayment WHERE loan_id = $1")
            .bind(loan.id)
            .fetch_one(&mut **transaction)
            .await?;
        let stored = usize::try_from(stored).unwrap_or_default();
        if loan.repayments.len() < stored {
            return Err(format!("Repayment history of loan {} is append-only", loan.id).into());
        }
        Self::insert_repayments(&mut **transaction, loan.id, stored, &loan.repayments[stored..])
            .await?;

        Ok(loan)
    }
}
