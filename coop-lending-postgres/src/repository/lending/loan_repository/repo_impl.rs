use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgConnection, Row};
use std::collections::HashMap;
use std::error::Error;
use uuid::Uuid;

use coop_lending_db::models::loan::{LoanModel, LoanStatus};
use coop_lending_db::models::repayment::RepaymentModel;
use coop_lending_db::models::surety::SuretyModel;
use coop_lending_db::repository::error::{RepositoryError, RepositoryResult};
use coop_lending_db::repository::loan_repository::LoanRepository;
use coop_lending_db::repository::pagination::{Page, PageRequest};

use crate::executor::Executor;
use crate::utils::{get_heapless_string, rows_into, unique_violation, TryFromRow};

/// Partial unique index allowing one approved or active loan per member
pub(super) const OPEN_LOAN_CONSTRAINT: &str = "loan_one_open_per_member";

pub struct LoanRepositoryImpl {
    pub executor: Executor,
}

impl LoanRepositoryImpl {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }

    /// Fill in sureties and repayment history of loans read from `loan`
    pub(super) async fn attach_children(
        conn: &mut PgConnection,
        loans: &mut [LoanModel],
    ) -> RepositoryResult<()> {
        if loans.is_empty() {
            return Ok(());
        }
        let ids: Vec<Uuid> = loans.iter().map(|l| l.id).collect();

        let surety_rows = sqlx::query(
            "SELECT * FROM loan_surety WHERE loan_id = ANY($1) ORDER BY loan_id, position",
        )
        .bind(&ids[..])
        .fetch_all(&mut *conn)
        .await?;
        let repayment_rows = sqlx::query(
            "SELECT * FROM loan_repayment WHERE loan_id = ANY($1) ORDER BY loan_id, position",
        )
        .bind(&ids[..])
        .fetch_all(&mut *conn)
        .await?;

        let mut sureties: HashMap<Uuid, Vec<SuretyModel>> = HashMap::new();
        for row in &surety_rows {
            let loan_id: Uuid = row.try_get("loan_id")?;
            let surety = SuretyModel::try_from_row(row).map_err(RepositoryError::Backend)?;
            sureties.entry(loan_id).or_default().push(surety);
        }
        let mut repayments: HashMap<Uuid, Vec<RepaymentModel>> = HashMap::new();
        for row in &repayment_rows {
            let loan_id: Uuid = row.try_get("loan_id")?;
            let repayment = RepaymentModel::try_from_row(row).map_err(RepositoryError::Backend)?;
            repayments.entry(loan_id).or_default().push(repayment);
        }

        for loan in loans.iter_mut() {
            loan.sureties = sureties.remove(&loan.id).unwrap_or_default();
            loan.repayments = repayments.remove(&loan.id).unwrap_or_default();
        }
        Ok(())
    }

    /// Decode loan rows and attach their children
    pub(super) async fn load_loans(
        conn: &mut PgConnection,
        rows: &[PgRow],
    ) -> RepositoryResult<Vec<LoanModel>> {
        let mut loans: Vec<LoanModel> = rows_into(rows)?;
        Self::attach_children(conn, &mut loans).await?;
        Ok(loans)
    }

    pub(super) fn map_write_error(err: sqlx::Error, member_id: Uuid) -> RepositoryError {
        if unique_violation(&err) == Some(OPEN_LOAN_CONSTRAINT) {
            RepositoryError::OpenLoanExists(member_id)
        } else {
            err.into()
        }
    }

    pub(super) async fn insert_repayments(
        conn: &mut PgConnection,
        loan_id: Uuid,
        first_position: usize,
        repayments: &[RepaymentModel],
    ) -> RepositoryResult<()> {
        for (offset, repayment) in repayments.iter().enumerate() {
            let position = i32::try_from(first_position + offset)
                .map_err(|_| format!("Too many repayments on loan {loan_id}"))?;
            sqlx::query(
                r#"
                INSERT INTO loan_repayment (loan_id, position, amount, paid_at, reference)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(loan_id)
            .bind(position)
            .bind(repayment.amount)
            .bind(repayment.paid_at)
            .bind(repayment.reference.as_str())
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }
}

impl TryFromRow<PgRow> for LoanModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(LoanModel {
            id: row.try_get("id")?,
            member_id: row.try_get("member_id")?,
            amount: row.try_get("amount")?,
            interest_rate: row.try_get("interest_rate")?,
            duration_months: row.try_get("duration_months")?,
            purpose: get_heapless_string(row, "purpose")?,
            payment_due_day: row.try_get("payment_due_day")?,
            status: row.try_get("status")?,
            sureties: Vec::new(),
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
            monthly_payment: row.try_get("monthly_payment")?,
            total_interest: row.try_get("total_interest")?,
            total_repayment: row.try_get("total_repayment")?,
            remaining_amount: row.try_get("remaining_amount")?,
            amount_paid: row.try_get("amount_paid")?,
            repayments: Vec::new(),
            next_payment_date: row.try_get("next_payment_date")?,
            approved_by: row.try_get("approved_by")?,
            approved_at: row.try_get("approved_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFromRow<PgRow> for SuretyModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(SuretyModel {
            member_id: row.try_get("member_id")?,
            status: row.try_get("status")?,
            responded_at: row.try_get("responded_at")?,
        })
    }
}

impl TryFromRow<PgRow> for RepaymentModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(RepaymentModel {
            amount: row.try_get("amount")?,
            paid_at: row.try_get("paid_at")?,
            reference: get_heapless_string(row, "reference")?,
        })
    }
}

#[async_trait]
impl LoanRepository for LoanRepositoryImpl {
    async fn create_loan(&self, loan: LoanModel) -> RepositoryResult<LoanModel> {
        Self::create_impl(self, loan).await
    }

    async fn update_loan(&self, loan: LoanModel) -> RepositoryResult<LoanModel> {
        Self::update_impl(self, loan).await
    }

    async fn find_loan_by_id(&self, id: Uuid) -> RepositoryResult<Option<LoanModel>> {
        Self::find_by_id_impl(self, id).await
    }

    async fn find_open_loan_by_member(
        &self,
        member_id: Uuid,
    ) -> RepositoryResult<Option<LoanModel>> {
        Self::find_open_by_member_impl(self, member_id).await
    }

    async fn find_loans_by_member(&self, member_id: Uuid) -> RepositoryResult<Vec<LoanModel>> {
        Self::find_by_member_impl(self, member_id).await
    }

    async fn find_loans_awaiting_surety(
        &self,
        surety_member_id: Uuid,
    ) -> RepositoryResult<Vec<LoanModel>> {
        Self::find_awaiting_surety_impl(self, surety_member_id).await
    }

    async fn find_loans_by_status(
        &self,
        status: Option<LoanStatus>,
        page: PageRequest,
    ) -> RepositoryResult<Page<LoanModel>> {
        Self::find_by_status_impl(self, status, page).await
    }
}
