//! Loan lifecycle engine.
//!
//! Owns every status transition of a loan and the balance and ledger side
//! effects that come with it. Each mutating operation:
//!
//! 1. validates its request,
//! 2. takes the loan lock, then the borrower lock ([`EntityLocks`]),
//! 3. runs inside one unit of work that is committed only if every step
//!    succeeded.

mod application;
mod decision;
mod delinquency;
mod queries;
mod repayment;
mod surety_response;

#[cfg(test)]
pub(crate) mod test_utils;

use tracing::error;
use uuid::Uuid;

use coop_lending_db::repository::loan_repository::LoanRepository;
use coop_lending_db::repository::unit_of_work::{LendingStore, UnitOfWork};

use crate::config::LendingConfig;
use crate::domain::outcomes::LendingOutcome;
use crate::domain::requests::LendingCommand;
use crate::error::{LendingError, LendingResult};
use crate::service::amortization::{compute_schedule, AmortizationSchedule};
use crate::service::clock::{Clock, SystemClock};
use crate::service::entity_locks::EntityLocks;
use crate::service::surety_gate::SuretyGate;

pub struct LoanLifecycleService<S: LendingStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
    config: LendingConfig,
    gate: SuretyGate,
    locks: EntityLocks,
}

impl<S: LendingStore> LoanLifecycleService<S, SystemClock> {
    pub fn with_system_clock(store: S, config: LendingConfig) -> Self {
        Self::new(store, SystemClock, config)
    }
}

impl<S: LendingStore, C: Clock> LoanLifecycleService<S, C> {
    pub fn new(store: S, clock: C, config: LendingConfig) -> Self {
        let gate = SuretyGate::new(config.surety_policy);
        Self {
            store,
            clock,
            config,
            gate,
            locks: EntityLocks::new(),
        }
    }

    pub fn config(&self) -> &LendingConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Quote a schedule without touching any loan
    pub fn compute_schedule(
        &self,
        principal: rust_decimal::Decimal,
        annual_rate_percent: rust_decimal::Decimal,
        months: u32,
    ) -> LendingResult<AmortizationSchedule> {
        compute_schedule(principal, annual_rate_percent, months)
    }

    /// Validate and run one command from the outer layer
    pub async fn handle(&self, command: LendingCommand) -> LendingResult<LendingOutcome> {
        match command {
            LendingCommand::ApplyForLoan(request) => {
                self.apply_for_loan(request).await.map(LendingOutcome::Loan)
            }
            LendingCommand::RespondToSurety(request) => self
                .respond_to_surety(request)
                .await
                .map(|()| LendingOutcome::SuretyRecorded),
            LendingCommand::DecideLoan(request) => {
                self.decide_loan(request).await.map(LendingOutcome::Loan)
            }
            LendingCommand::ApplyRepayment(request) => self
                .apply_repayment(request)
                .await
                .map(LendingOutcome::Repayment),
            LendingCommand::MarkDefaulted(request) => self
                .mark_defaulted(request.loan_id)
                .await
                .map(LendingOutcome::Loan),
        }
    }

    /// Commit on success, roll back on failure
    async fn finish<T>(session: S::Session, result: LendingResult<T>) -> LendingResult<T> {
        match result {
            Ok(value) => {
                session.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = session.rollback().await {
                    error!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Borrower of a loan. The owner never changes, so it can be read
    /// before the borrower lock is taken.
    async fn loan_owner(&self, loan_id: Uuid) -> LendingResult<Uuid> {
        let session = self.store.begin().await?;
        let result = session
            .find_loan_by_id(loan_id)
            .await
            .map_err(LendingError::from)
            .and_then(|loan| loan.map(|l| l.member_id).ok_or(LendingError::LoanNotFound(loan_id)));
        Self::finish(session, result).await
    }
}
