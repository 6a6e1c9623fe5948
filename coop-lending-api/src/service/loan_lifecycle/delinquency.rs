use chrono::Duration;
use tracing::{instrument, warn};
use uuid::Uuid;

use coop_lending_db::models::loan::{LoanModel, LoanStatus};
use coop_lending_db::repository::loan_repository::LoanRepository;
use coop_lending_db::repository::unit_of_work::LendingStore;

use super::LoanLifecycleService;
use crate::error::{LendingError, LendingResult};
use crate::service::clock::Clock;

impl<S: LendingStore, C: Clock> LoanLifecycleService<S, C> {
    /// Move an open loan to `Defaulted` once its next payment date is more
    /// than the configured grace period in the past.
    ///
    /// Meant for an external scheduler. Balances and the ledger are untouched.
    #[instrument(skip(self), fields(grace_days = self.config.default_grace_days))]
    pub async fn mark_defaulted(&self, loan_id: Uuid) -> LendingResult<LoanModel> {
        let _loan_guard = self.locks.lock(loan_id).await;

        let session = self.store.begin().await?;
        let result = async {
            let mut loan = session
                .find_loan_by_id(loan_id)
                .await?
                .ok_or(LendingError::LoanNotFound(loan_id))?;
            if !loan.status.is_open() {
                return Err(LendingError::LoanNotActive(loan_id));
            }

            let now = self.clock.now();
            let grace = Duration::try_days(self.config.default_grace_days);
            let overdue_since = loan
                .next_payment_date
                .zip(grace)
                .and_then(|(due, grace)| due.checked_add_signed(grace));
            match overdue_since {
                Some(limit) if now.date_naive() > limit => {}
                _ => return Err(LendingError::LoanNotOverdue(loan_id)),
            }

            loan.status = LoanStatus::Defaulted;
            loan.updated_at = now;
            let loan = session.update_loan(loan).await?;
            warn!(
                next_payment_date = ?loan.next_payment_date,
                remaining = ?loan.remaining_amount,
                "Loan marked defaulted"
            );
            Ok::<_, LendingError>(loan)
        }
        .await;
        Self::finish(session, result).await
    }
}
