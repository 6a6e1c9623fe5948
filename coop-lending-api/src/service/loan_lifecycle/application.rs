use heapless::String as HeaplessString;
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use coop_lending_db::models::loan::{LoanModel, LoanStatus};
use coop_lending_db::models::surety::SuretyModel;
use coop_lending_db::repository::loan_repository::LoanRepository;
use coop_lending_db::repository::member_repository::MemberRepository;
use coop_lending_db::repository::unit_of_work::LendingStore;

use super::LoanLifecycleService;
use crate::domain::requests::ApplyForLoanRequest;
use crate::error::{LendingError, LendingResult};
use crate::service::amortization::compute_schedule;
use crate::service::clock::Clock;

impl<S: LendingStore, C: Clock> LoanLifecycleService<S, C> {
    /// Submit a loan application.
    ///
    /// The loan starts `Pending` at the configured interest rate with every
    /// surety `Pending`. Sureties are named by phone number; each number must
    /// resolve to a member other than the applicant.
    #[instrument(skip(self, request), fields(member_id = %request.member_id))]
    pub async fn apply_for_loan(&self, request: ApplyForLoanRequest) -> LendingResult<LoanModel> {
        request.check()?;
        let _member_guard = self.locks.lock(request.member_id).await;

        let session = self.store.begin().await?;
        let result = self.apply_in(&session, &request).await;
        Self::finish(session, result).await
    }

    async fn apply_in(
        &self,
        session: &S::Session,
        request: &ApplyForLoanRequest,
    ) -> LendingResult<LoanModel> {
        let borrower = session
            .find_member_by_id(request.member_id)
            .await?
            .ok_or(LendingError::MemberNotFound(request.member_id))?;

        if let Some(open) = session.find_open_loan_by_member(borrower.id).await? {
            warn!(open_loan_id = %open.id, "Application refused: member has an open loan");
            return Err(LendingError::ExistingActiveLoan(borrower.id));
        }

        let mut phone_numbers: Vec<String> = Vec::with_capacity(request.surety_phone_numbers.len());
        for phone in &request.surety_phone_numbers {
            let phone = phone.trim().to_string();
            if !phone.is_empty() && !phone_numbers.contains(&phone) {
                phone_numbers.push(phone);
            }
        }
        if phone_numbers.is_empty() {
            return Err(LendingError::NoSureties);
        }

        let sureties = session.find_members_by_phone_numbers(&phone_numbers).await?;
        let missing: Vec<String> = phone_numbers
            .iter()
            .filter(|phone| {
                !sureties
                    .iter()
                    .any(|m| m.phone_number.as_str() == phone.as_str())
            })
            .cloned()
            .collect();
        if !missing.is_empty() {
            warn!(missing = ?missing, "Application refused: unknown surety phone numbers");
            return Err(LendingError::SuretyNotFound(missing));
        }
        if sureties.iter().any(|m| m.id == borrower.id) {
            return Err(LendingError::InvalidLoanTerms(
                "a member cannot stand surety for their own loan".to_string(),
            ));
        }

        // fail now rather than at activation if the terms cannot be amortized
        compute_schedule(
            request.amount,
            self.config.interest_rate_percent,
            request.duration_months,
        )?;

        let duration_months = i32::try_from(request.duration_months).map_err(|_| {
            LendingError::InvalidLoanTerms(format!(
                "duration of {} months is too long",
                request.duration_months
            ))
        })?;
        let payment_due_day = request
            .payment_due_day
            .unwrap_or(self.config.default_payment_due_day);
        let purpose = HeaplessString::try_from(request.purpose.trim()).map_err(|_| {
            LendingError::InvalidLoanTerms("purpose is longer than 255 bytes".to_string())
        })?;

        let now = self.clock.now();
        let loan = LoanModel {
            id: uuid::Uuid::new_v4(),
            member_id: borrower.id,
            amount: request.amount,
            interest_rate: self.config.interest_rate_percent,
            duration_months,
            purpose,
            payment_due_day: payment_due_day as i32,
            status: LoanStatus::Pending,
            sureties: sureties.iter().map(|m| SuretyModel::pending(m.id)).collect(),
            start_date: None,
            end_date: None,
            monthly_payment: None,
            total_interest: None,
            total_repayment: None,
            remaining_amount: None,
            amount_paid: Decimal::ZERO,
            repayments: Vec::new(),
            next_payment_date: None,
            approved_by: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        };

        let loan = session.create_loan(loan).await?;
        info!(
            loan_id = %loan.id,
            amount = %loan.amount,
            duration_months = loan.duration_months,
            sureties = loan.sureties.len(),
            "Loan application submitted"
        );
        Ok(loan)
    }
}
