use coop_lending_db::models::loan::LoanModel;
use coop_lending_db::repository::error::{RepositoryError, RepositoryResult};

use super::repo_impl::LoanRepositoryImpl;

impl LoanRepositoryImpl {
    pub(super) async fn create_impl(
        repo: &LoanRepositoryImpl,
        loan: LoanModel,
    ) -> RepositoryResult<LoanModel> {
        let mut tx = repo.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or(RepositoryError::TransactionConsumed)?;

        sqlx::query(
            r#"
            INSERT INTO loan (
                id, member_id, amount, interest_rate, duration_months, purpose,
                payment_due_day, status, start_date, end_date, monthly_payment,
                total_interest, total_repayment, remaining_amount, amount_paid,
                next_payment_date, approved_by, approved_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            "#,
        )
        .bind(loan.id)
        .bind(loan.member_id)
        .bind(loan.amount)
        .bind(loan.interest_rate)
        .bind(loan.duration_months)
        .bind(loan.purpose.as_str())
        .bind(loan.payment_due_day)
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
        .bind(loan.created_at)
        .bind(loan.updated_at)
        .execute(&mut **transaction)
        .await
        .map_err(|err| Self::map_write_error(err, loan.member_id))?;

        for (position, surety) in loan.sureties.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO loan_surety (loan_id, member_id, position, status, responded_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(loan.id)
            .bind(surety.member_id)
            .bind(position as i32)
            .bind(surety.status)
            .bind(surety.responded_at)
            .execute(&mut **transaction)
            .await?;
        }

        Self::insert_repayments(&mut **transaction, loan.id, 0, &loan.repayments).await?;

        Ok(loan)
    }
}
