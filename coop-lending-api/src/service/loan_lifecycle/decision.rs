use chrono::Months;
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use coop_lending_db::models::ledger_entry::{LedgerEntryModel, TransactionStatus, TransactionType};
use coop_lending_db::models::loan::{LoanModel, LoanStatus};
use coop_lending_db::repository::ledger_repository::LedgerRepository;
use coop_lending_db::repository::loan_repository::LoanRepository;
use coop_lending_db::repository::member_repository::MemberRepository;
use coop_lending_db::repository::unit_of_work::LendingStore;

use super::LoanLifecycleService;
use crate::domain::requests::{LoanDecision, LoanDecisionRequest};
use crate::error::{LendingError, LendingResult};
use crate::service::amortization::compute_schedule;
use crate::service::clock::Clock;
use crate::service::payment_calendar::next_payment_date;
use crate::service::reference::{bounded_text, generate_reference, DISBURSEMENT_PREFIX};

impl<S: LendingStore, C: Clock> LoanLifecycleService<S, C> {
    /// Administrator decision on a pending loan.
    ///
    /// Rejection only changes the status. Approval requires the surety gate to
    /// pass and the borrower to hold no other open loan, then activates the
    /// loan: amortization, dates, balance credit of the principal and a
    /// `loan_disbursement` ledger entry, all in one unit of work.
    #[instrument(skip(self, request), fields(loan_id = %request.loan_id, decision = ?request.decision))]
    pub async fn decide_loan(&self, request: LoanDecisionRequest) -> LendingResult<LoanModel> {
        let _loan_guard = self.locks.lock(request.loan_id).await;
        let borrower_id = self.loan_owner(request.loan_id).await?;
        let _member_guard = self.locks.lock(borrower_id).await;

        let session = self.store.begin().await?;
        let result = self.decide_in(&session, &request).await;
        Self::finish(session, result).await
    }

    async fn decide_in(
        &self,
        session: &S::Session,
        request: &LoanDecisionRequest,
    ) -> LendingResult<LoanModel> {
        let mut loan = session
            .find_loan_by_id(request.loan_id)
            .await?
            .ok_or(LendingError::LoanNotFound(request.loan_id))?;
        if loan.status != LoanStatus::Pending {
            return Err(LendingError::LoanNotPending(loan.id));
        }

        let now = self.clock.now();
        match request.decision {
            LoanDecision::Rejected => {
                loan.status = LoanStatus::Rejected;
                loan.updated_at = now;
                let loan = session.update_loan(loan).await?;
                info!(decided_by = %request.decided_by, "Loan rejected");
                Ok(loan)
            }
            LoanDecision::Approved => self.activate(session, loan, request.decided_by).await,
        }
    }

    async fn activate(
        &self,
        session: &S::Session,
        mut loan: LoanModel,
        decided_by: Uuid,
    ) -> LendingResult<LoanModel> {
        if !self.gate.is_approvable(&loan) {
            warn!(
                policy = ?self.gate.policy(),
                blocked = self.gate.is_blocked(&loan),
                "Approval refused: surety gate not satisfied"
            );
            return Err(LendingError::SuretyGateNotSatisfied(loan.id));
        }
        if let Some(open) = session.find_open_loan_by_member(loan.member_id).await? {
            if open.id != loan.id {
                return Err(LendingError::ExistingActiveLoan(loan.member_id));
            }
        }
        let borrower = session
            .find_member_by_id(loan.member_id)
            .await?
            .ok_or(LendingError::MemberNotFound(loan.member_id))?;

        let months = u32::try_from(loan.duration_months).map_err(|_| {
            LendingError::InvalidLoanTerms(format!("duration {} months", loan.duration_months))
        })?;
        let due_day = u32::try_from(loan.payment_due_day).map_err(|_| {
            LendingError::InvalidLoanTerms(format!("payment due day {}", loan.payment_due_day))
        })?;
        let schedule = compute_schedule(loan.amount, loan.interest_rate, months)?;

        let now = self.clock.now();
        let next_payment = next_payment_date(now.date_naive(), due_day).ok_or_else(|| {
            LendingError::InvalidLoanTerms(format!("payment due day {due_day}"))
        })?;
        let end_date = now.checked_add_months(Months::new(months)).ok_or_else(|| {
            LendingError::InvalidLoanTerms(format!("duration {months} months"))
        })?;

        loan.status = LoanStatus::Active;
        loan.start_date = Some(now);
        loan.end_date = Some(end_date);
        loan.monthly_payment = Some(schedule.monthly_payment);
        loan.total_interest = Some(schedule.total_interest);
        loan.total_repayment = Some(schedule.total_repayment);
        loan.remaining_amount = Some(schedule.total_repayment);
        loan.amount_paid = Decimal::ZERO;
        loan.next_payment_date = Some(next_payment);
        loan.approved_by = Some(decided_by);
        loan.approved_at = Some(now);
        loan.updated_at = now;

        let balance_before = borrower.balance;
        let balance_after = balance_before + loan.amount;
        session
            .update_member_balance(borrower.id, balance_after)
            .await?;

        let description = format!("Loan disbursement: {}", loan.purpose);
        let entry = LedgerEntryModel {
            id: Uuid::new_v4(),
            member_id: borrower.id,
            loan_id: Some(loan.id),
            transaction_type: TransactionType::LoanDisbursement,
            amount: loan.amount,
            description: bounded_text(&description),
            reference: Some(generate_reference(DISBURSEMENT_PREFIX, now)),
            balance_before,
            balance_after,
            status: TransactionStatus::Completed,
            created_at: now,
        };
        let entry = session.append_ledger_entry(entry).await?;

        let loan = session.update_loan(loan).await?;
        info!(
            decided_by = %decided_by,
            monthly_payment = %schedule.monthly_payment.round_dp(2),
            total_repayment = %schedule.total_repayment.round_dp(2),
            next_payment_date = %next_payment,
            reference = ?entry.reference,
            "Loan approved and disbursed"
        );
        Ok(loan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LendingConfig;
    use crate::domain::requests::SuretyDecision;
    use crate::service::loan_lifecycle::test_utils::TestHarness;
    use crate::service::surety_gate::SuretyPolicy;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_approval_activates_and_disburses() {
        let h = TestHarness::new().await;
        let borrower = h.add_member("0801", dec!(250)).await;
        let surety = h.add_member("0802", dec!(0)).await;
        let loan = h.pending_loan(&borrower, dec!(100000), 12, &["0802"]).await;
        h.respond(loan.id, surety.id, SuretyDecision::Approved).await;

        let loan = h.approve(loan.id).await.unwrap();

        assert_eq!(loan.status, LoanStatus::Active);
        assert_eq!(loan.monthly_payment.unwrap().round_dp(2), dec!(8560.75));
        assert_eq!(loan.total_repayment.unwrap().round_dp(2), dec!(102728.98));
        assert_eq!(loan.total_interest.unwrap().round_dp(2), dec!(2728.98));
        assert_eq!(loan.remaining_amount, loan.total_repayment);
        assert_eq!(loan.amount_paid, Decimal::ZERO);
        assert_eq!(loan.start_date, Some(h.clock.now()));
        assert_eq!(
            loan.end_date.map(|d| d.date_naive()),
            NaiveDate::from_ymd_opt(2025, 1, 20)
        );
        // activated on 2024-01-20, past the 15th
        assert_eq!(loan.next_payment_date, NaiveDate::from_ymd_opt(2024, 2, 15));
        assert_eq!(loan.approved_by, Some(h.admin));
        assert_eq!(loan.approved_at, Some(h.clock.now()));

        assert_eq!(h.balance(borrower.id).await, dec!(100250));
        let ledger = h.service.member_ledger(borrower.id).await.unwrap();
        assert_eq!(ledger.len(), 1);
        let entry = &ledger[0];
        assert_eq!(entry.transaction_type, TransactionType::LoanDisbursement);
        assert_eq!(entry.amount, dec!(100000));
        assert_eq!(entry.balance_before, dec!(250));
        assert_eq!(entry.balance_after, dec!(100250));
        assert_eq!(entry.loan_id, Some(loan.id));
        assert_eq!(entry.status, TransactionStatus::Completed);
        assert!(entry.reference.as_ref().unwrap().starts_with("LND-"));
    }

    #[tokio::test]
    async fn test_gate_not_satisfied_leaves_loan_pending() {
        let h = TestHarness::new().await;
        let borrower = h.add_member("0801", dec!(0)).await;
        let first = h.add_member("0802", dec!(0)).await;
        h.add_member("0803", dec!(0)).await;
        let loan = h.pending_loan(&borrower, dec!(1000), 6, &["0802", "0803"]).await;
        h.respond(loan.id, first.id, SuretyDecision::Approved).await;

        let result = h.approve(loan.id).await;
        assert!(matches!(result, Err(LendingError::SuretyGateNotSatisfied(id)) if id == loan.id));

        let stored = h.service.get_loan(loan.id).await.unwrap();
        assert_eq!(stored.status, LoanStatus::Pending);
        assert!(stored.remaining_amount.is_none());
        assert_eq!(h.balance(borrower.id).await, Decimal::ZERO);
        assert!(h.service.member_ledger(borrower.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_partial_approval_passes_lenient_policy() {
        let h = TestHarness::with_config(LendingConfig {
            surety_policy: SuretyPolicy::NoRejections,
            ..Default::default()
        })
        .await;
        let borrower = h.add_member("0801", dec!(0)).await;
        let first = h.add_member("0802", dec!(0)).await;
        h.add_member("0803", dec!(0)).await;
        let loan = h.pending_loan(&borrower, dec!(1000), 6, &["0802", "0803"]).await;
        h.respond(loan.id, first.id, SuretyDecision::Approved).await;

        let loan = h.approve(loan.id).await.unwrap();
        assert_eq!(loan.status, LoanStatus::Active);
    }

    #[tokio::test]
    async fn test_rejected_surety_blocks_approval() {
        let h = TestHarness::with_config(LendingConfig {
            surety_policy: SuretyPolicy::NoRejections,
            ..Default::default()
        })
        .await;
        let borrower = h.add_member("0801", dec!(0)).await;
        let first = h.add_member("0802", dec!(0)).await;
        let second = h.add_member("0803", dec!(0)).await;
        let loan = h.pending_loan(&borrower, dec!(1000), 6, &["0802", "0803"]).await;
        h.respond(loan.id, first.id, SuretyDecision::Approved).await;
        h.respond(loan.id, second.id, SuretyDecision::Rejected).await;

        let result = h.approve(loan.id).await;
        assert!(matches!(result, Err(LendingError::SuretyGateNotSatisfied(_))));
    }

    #[tokio::test]
    async fn test_rejection_needs_no_surety_answers() {
        let h = TestHarness::new().await;
        let borrower = h.add_member("0801", dec!(0)).await;
        h.add_member("0802", dec!(0)).await;
        let loan = h.pending_loan(&borrower, dec!(1000), 6, &["0802"]).await;

        let loan = h.reject(loan.id).await;
        assert_eq!(loan.status, LoanStatus::Rejected);
        assert!(loan.approved_by.is_none());
        assert_eq!(h.balance(borrower.id).await, Decimal::ZERO);

        let again = h.approve(loan.id).await;
        assert!(matches!(again, Err(LendingError::LoanNotPending(_))));
    }

    #[tokio::test]
    async fn test_second_pending_application_cannot_activate() {
        let h = TestHarness::new().await;
        let borrower = h.add_member("0801", dec!(0)).await;
        let surety = h.add_member("0802", dec!(0)).await;
        let first = h.pending_loan(&borrower, dec!(1000), 6, &["0802"]).await;
        let second = h.pending_loan(&borrower, dec!(2000), 6, &["0802"]).await;
        h.respond(first.id, surety.id, SuretyDecision::Approved).await;
        h.respond(second.id, surety.id, SuretyDecision::Approved).await;

        h.approve(first.id).await.unwrap();
        let result = h.approve(second.id).await;
        assert!(matches!(result, Err(LendingError::ExistingActiveLoan(id)) if id == borrower.id));
        assert_eq!(h.balance(borrower.id).await, dec!(1000));
    }

    #[tokio::test]
    async fn test_unknown_loan() {
        let h = TestHarness::new().await;
        let result = h.approve(Uuid::new_v4()).await;
        assert!(matches!(result, Err(LendingError::LoanNotFound(_))));
    }
}
