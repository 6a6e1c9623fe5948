use tracing::{info, instrument};

use coop_lending_db::models::loan::LoanStatus;
use coop_lending_db::repository::loan_repository::LoanRepository;
use coop_lending_db::repository::unit_of_work::LendingStore;

use super::LoanLifecycleService;
use crate::domain::requests::SuretyResponseRequest;
use crate::error::{LendingError, LendingResult};
use crate::service::clock::Clock;

impl<S: LendingStore, C: Clock> LoanLifecycleService<S, C> {
    /// Record a surety's approval or rejection of a pending loan.
    ///
    /// Each surety answers once. The loan status is untouched: the gate is
    /// evaluated when the administrator decides.
    #[instrument(skip(self, request), fields(loan_id = %request.loan_id, surety_id = %request.member_id))]
    pub async fn respond_to_surety(&self, request: SuretyResponseRequest) -> LendingResult<()> {
        let _loan_guard = self.locks.lock(request.loan_id).await;

        let session = self.store.begin().await?;
        let result = async {
            let mut loan = session
                .find_loan_by_id(request.loan_id)
                .await?
                .ok_or(LendingError::LoanNotFound(request.loan_id))?;
            if loan.status != LoanStatus::Pending {
                return Err(LendingError::LoanNotPending(loan.id));
            }

            let now = self.clock.now();
            self.gate
                .respond(&mut loan, request.member_id, request.decision, now)?;
            loan.updated_at = now;
            session.update_loan(loan).await?;

            info!(decision = ?request.decision, "Surety response recorded");
            Ok::<_, LendingError>(())
        }
        .await;
        Self::finish(session, result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::requests::SuretyDecision;
    use crate::service::loan_lifecycle::test_utils::TestHarness;
    use coop_lending_db::models::surety::SuretyStatus;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_surety_approval_is_recorded_once() {
        let h = TestHarness::new().await;
        let borrower = h.add_member("0801", dec!(0)).await;
        let surety = h.add_member("0802", dec!(0)).await;
        let loan = h.pending_loan(&borrower, dec!(1000), 6, &["0802"]).await;

        h.service
            .respond_to_surety(SuretyResponseRequest {
                loan_id: loan.id,
                member_id: surety.id,
                decision: SuretyDecision::Approved,
            })
            .await
            .unwrap();

        let stored = h.service.get_loan(loan.id).await.unwrap();
        let entry = stored.surety(surety.id).unwrap();
        assert_eq!(entry.status, SuretyStatus::Approved);
        assert_eq!(entry.responded_at, Some(h.clock.now()));
        assert_eq!(stored.status, LoanStatus::Pending);

        let again = h
            .service
            .respond_to_surety(SuretyResponseRequest {
                loan_id: loan.id,
                member_id: surety.id,
                decision: SuretyDecision::Rejected,
            })
            .await;
        assert!(matches!(again, Err(LendingError::AlreadyResponded { .. })));
        let stored = h.service.get_loan(loan.id).await.unwrap();
        assert_eq!(stored.surety(surety.id).unwrap().status, SuretyStatus::Approved);
    }

    #[tokio::test]
    async fn test_non_surety_cannot_respond() {
        let h = TestHarness::new().await;
        let borrower = h.add_member("0801", dec!(0)).await;
        h.add_member("0802", dec!(0)).await;
        let outsider = h.add_member("0803", dec!(0)).await;
        let loan = h.pending_loan(&borrower, dec!(1000), 6, &["0802"]).await;

        let result = h
            .service
            .respond_to_surety(SuretyResponseRequest {
                loan_id: loan.id,
                member_id: outsider.id,
                decision: SuretyDecision::Approved,
            })
            .await;
        assert!(matches!(
            result,
            Err(LendingError::NotASurety { loan_id, member_id }) if loan_id == loan.id && member_id == outsider.id
        ));
    }

    #[tokio::test]
    async fn test_unknown_loan() {
        let h = TestHarness::new().await;
        let result = h
            .service
            .respond_to_surety(SuretyResponseRequest {
                loan_id: Uuid::new_v4(),
                member_id: Uuid::new_v4(),
                decision: SuretyDecision::Approved,
            })
            .await;
        assert!(matches!(result, Err(LendingError::LoanNotFound(_))));
    }

    #[tokio::test]
    async fn test_response_after_decision_is_refused() {
        let h = TestHarness::new().await;
        let borrower = h.add_member("0801", dec!(0)).await;
        let first = h.add_member("0802", dec!(0)).await;
        let second = h.add_member("0803", dec!(0)).await;
        let loan = h.pending_loan(&borrower, dec!(1000), 6, &["0802", "0803"]).await;

        h.respond(loan.id, first.id, SuretyDecision::Rejected).await;
        h.reject(loan.id).await;

        let result = h
            .service
            .respond_to_surety(SuretyResponseRequest {
                loan_id: loan.id,
                member_id: second.id,
                decision: SuretyDecision::Approved,
            })
            .await;
        assert!(matches!(result, Err(LendingError::LoanNotPending(id)) if id == loan.id));
    }
}
