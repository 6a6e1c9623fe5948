use rust_decimal::Decimal;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use coop_lending_db::models::ledger_entry::{LedgerEntryModel, TransactionStatus, TransactionType};
use coop_lending_db::models::loan::LoanStatus;
use coop_lending_db::models::repayment::RepaymentModel;
use coop_lending_db::repository::ledger_repository::LedgerRepository;
use coop_lending_db::repository::loan_repository::LoanRepository;
use coop_lending_db::repository::member_repository::MemberRepository;
use coop_lending_db::repository::unit_of_work::LendingStore;

use super::LoanLifecycleService;
use crate::domain::outcomes::RepaymentOutcome;
use crate::domain::requests::RepaymentRequest;
use crate::error::{LendingError, LendingResult};
use crate::service::clock::Clock;
use crate::service::payment_calendar::next_payment_date;
use crate::service::reference::{bounded_text, generate_reference, parse_reference, REPAYMENT_PREFIX};

impl<S: LendingStore, C: Clock> LoanLifecycleService<S, C> {
    /// Apply a repayment from the borrower's balance.
    ///
    /// The debit, the repayment history entry, the `loan_repayment` ledger
    /// entry and the loan's new totals commit together or not at all. A loan
    /// repaid down to zero completes.
    #[instrument(skip(self, request), fields(loan_id = %request.loan_id, amount = %request.amount))]
    pub async fn apply_repayment(&self, request: RepaymentRequest) -> LendingResult<RepaymentOutcome> {
        request.check()?;
        let _loan_guard = self.locks.lock(request.loan_id).await;
        let borrower_id = self.loan_owner(request.loan_id).await?;
        let _member_guard = self.locks.lock(borrower_id).await;

        let session = self.store.begin().await?;
        let result = self.repay_in(&session, &request).await;
        Self::finish(session, result).await
    }

    async fn repay_in(
        &self,
        session: &S::Session,
        request: &RepaymentRequest,
    ) -> LendingResult<RepaymentOutcome> {
        let mut loan = session
            .find_loan_by_id(request.loan_id)
            .await?
            .ok_or(LendingError::LoanNotFound(request.loan_id))?;
        if !loan.status.is_open() {
            return Err(LendingError::LoanNotActive(loan.id));
        }
        let (Some(remaining), Some(total)) = (loan.remaining_amount, loan.total_repayment) else {
            return Err(LendingError::LoanNotActive(loan.id));
        };

        let amount = request.amount;
        if amount <= Decimal::ZERO {
            return Err(LendingError::InvalidAmount(format!(
                "{amount} must be greater than zero"
            )));
        }
        if amount > remaining {
            return Err(LendingError::AmountExceedsRemaining { amount, remaining });
        }

        let borrower = session
            .find_member_by_id(loan.member_id)
            .await?
            .ok_or(LendingError::MemberNotFound(loan.member_id))?;
        if borrower.balance < amount {
            warn!(balance = %borrower.balance, "Repayment refused: insufficient funds");
            return Err(LendingError::InsufficientFunds {
                balance: borrower.balance,
                amount,
            });
        }

        let now = self.clock.now();
        let reference = match request.reference.as_deref() {
            Some(text) => parse_reference(text)?,
            None => generate_reference(REPAYMENT_PREFIX, now),
        };
        if session
            .find_ledger_entry_by_reference(reference.as_str())
            .await?
            .is_some()
        {
            return Err(LendingError::DuplicateReference(reference.to_string()));
        }

        let balance_before = borrower.balance;
        let balance_after = balance_before - amount;
        session
            .update_member_balance(borrower.id, balance_after)
            .await?;

        loan.repayments.push(RepaymentModel {
            amount,
            paid_at: now,
            reference: reference.clone(),
        });
        loan.amount_paid += amount;
        let remaining = total - loan.amount_paid;
        loan.remaining_amount = Some(remaining);
        if remaining <= Decimal::ZERO {
            loan.status = LoanStatus::Completed;
            loan.next_payment_date = None;
        } else {
            loan.status = LoanStatus::Active;
            let due_day = u32::try_from(loan.payment_due_day).map_err(|_| {
                LendingError::InvalidLoanTerms(format!("payment due day {}", loan.payment_due_day))
            })?;
            loan.next_payment_date = next_payment_date(now.date_naive(), due_day);
        }
        loan.updated_at = now;

        let description = format!("Loan repayment: {}", loan.purpose);
        let entry = LedgerEntryModel {
            id: Uuid::new_v4(),
            member_id: borrower.id,
            loan_id: Some(loan.id),
            transaction_type: TransactionType::LoanRepayment,
            amount,
            description: bounded_text(&description),
            reference: Some(reference),
            balance_before,
            balance_after,
            status: TransactionStatus::Completed,
            created_at: now,
        };
        let ledger_entry = session.append_ledger_entry(entry).await?;
        let loan = session.update_loan(loan).await?;

        info!(
            remaining = %remaining.round_dp(2),
            status = %loan.status,
            reference = ?ledger_entry.reference,
            "Repayment applied"
        );
        Ok(RepaymentOutcome {
            loan,
            new_balance: balance_after,
            ledger_entry,
        })
    }
}
