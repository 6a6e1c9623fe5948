use tracing::{debug, instrument};
use uuid::Uuid;

use coop_lending_db::models::ledger_entry::LedgerEntryModel;
use coop_lending_db::models::loan::LoanModel;
use coop_lending_db::repository::ledger_repository::LedgerRepository;
use coop_lending_db::repository::loan_repository::LoanRepository;
use coop_lending_db::repository::pagination::{Page, PageRequest};
use coop_lending_db::repository::unit_of_work::LendingStore;

use super::LoanLifecycleService;
use crate::domain::requests::ListLoansRequest;
use crate::error::{LendingError, LendingResult};
use crate::service::amortization::{installment_plan, Installment};
use crate::service::clock::Clock;

const DEFAULT_PAGE_SIZE: usize = 20;

impl<S: LendingStore, C: Clock> LoanLifecycleService<S, C> {
    pub async fn get_loan(&self, loan_id: Uuid) -> LendingResult<LoanModel> {
        let session = self.store.begin().await?;
        let result = session
            .find_loan_by_id(loan_id)
            .await
            .map_err(LendingError::from)
            .and_then(|loan| loan.ok_or(LendingError::LoanNotFound(loan_id)));
        Self::finish(session, result).await
    }

    /// The member's approved or active loan, if any
    pub async fn get_active_loan(&self, member_id: Uuid) -> LendingResult<Option<LoanModel>> {
        let session = self.store.begin().await?;
        let result = session
            .find_open_loan_by_member(member_id)
            .await
            .map_err(LendingError::from);
        Self::finish(session, result).await
    }

    /// Administrator listing, newest first
    #[instrument(skip(self, request), fields(status = ?request.status))]
    pub async fn list_loans(&self, request: ListLoansRequest) -> LendingResult<Page<LoanModel>> {
        request.check()?;
        let page = PageRequest::for_page(
            request.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            request.page.unwrap_or(1),
        );

        let session = self.store.begin().await?;
        let result = session
            .find_loans_by_status(request.status, page)
            .await
            .map_err(LendingError::from);
        if let Ok(found) = &result {
            debug!(total = found.total, returned = found.items.len(), "Listed loans");
        }
        Self::finish(session, result).await
    }

    /// Loan history of a member, newest first
    pub async fn member_loans(&self, member_id: Uuid) -> LendingResult<Vec<LoanModel>> {
        let session = self.store.begin().await?;
        let result = session
            .find_loans_by_member(member_id)
            .await
            .map_err(LendingError::from);
        Self::finish(session, result).await
    }

    /// Pending loans still waiting for this member's surety answer
    pub async fn pending_surety_requests(&self, member_id: Uuid) -> LendingResult<Vec<LoanModel>> {
        let session = self.store.begin().await?;
        let result = session
            .find_loans_awaiting_surety(member_id)
            .await
            .map_err(LendingError::from);
        Self::finish(session, result).await
    }

    pub async fn member_ledger(&self, member_id: Uuid) -> LendingResult<Vec<LedgerEntryModel>> {
        let session = self.store.begin().await?;
        let result = session
            .find_ledger_entries_by_member(member_id)
            .await
            .map_err(LendingError::from);
        Self::finish(session, result).await
    }

    /// Installment breakdown of an activated loan, starting from its start
    /// date.
    pub async fn installment_plan_for(&self, loan_id: Uuid) -> LendingResult<Vec<Installment>> {
        let loan = self.get_loan(loan_id).await?;
        let start = loan.start_date.ok_or(LendingError::LoanNotActive(loan_id))?;
        let months = u32::try_from(loan.duration_months).map_err(|_| {
            LendingError::InvalidLoanTerms(format!("duration {} months", loan.duration_months))
        })?;
        let due_day = u32::try_from(loan.payment_due_day).map_err(|_| {
            LendingError::InvalidLoanTerms(format!("payment due day {}", loan.payment_due_day))
        })?;
        installment_plan(
            loan.amount,
            loan.interest_rate,
            months,
            start.date_naive(),
            due_day,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::requests::SuretyDecision;
    use crate::service::loan_lifecycle::test_utils::TestHarness;
    use chrono::NaiveDate;
    use coop_lending_db::models::loan::LoanStatus;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_get_loan_unknown() {
        let h = TestHarness::new().await;
        let result = h.service.get_loan(Uuid::new_v4()).await;
        assert!(matches!(result, Err(LendingError::LoanNotFound(_))));
    }

    #[tokio::test]
    async fn test_active_loan_lookup() {
        let h = TestHarness::new().await;
        let borrower = h.add_member("0801", dec!(0)).await;
        h.add_member("0802", dec!(0)).await;
        assert!(h.service.get_active_loan(borrower.id).await.unwrap().is_none());

        let loan = h.active_loan(&borrower, dec!(1000), 6, "0802").await;
        let found = h.service.get_active_loan(borrower.id).await.unwrap();
        assert_eq!(found.map(|l| l.id), Some(loan.id));
    }

    #[tokio::test]
    async fn test_list_loans_filters_and_pages() {
        let h = TestHarness::new().await;
        h.add_member("0900", dec!(0)).await;
        let mut ids = Vec::new();
        for i in 0..5 {
            let borrower = h.add_member(&format!("081{i}"), dec!(0)).await;
            let loan = h.pending_loan(&borrower, dec!(1000), 6, &["0900"]).await;
            ids.push(loan.id);
        }
        h.reject(ids[0]).await;

        let pending = h
            .service
            .list_loans(ListLoansRequest {
                status: Some(LoanStatus::Pending),
                page_size: Some(3),
                page: Some(1),
            })
            .await
            .unwrap();
        assert_eq!(pending.total, 4);
        assert_eq!(pending.items.len(), 3);
        assert_eq!(pending.items[0].id, ids[4]);
        assert!(pending.has_more());

        let all = h.service.list_loans(ListLoansRequest::default()).await.unwrap();
        assert_eq!(all.total, 5);

        let bad = h
            .service
            .list_loans(ListLoansRequest {
                page_size: Some(0),
                ..Default::default()
            })
            .await;
        assert!(matches!(bad, Err(LendingError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_loans_far_page_numbers() {
        let h = TestHarness::new().await;
        let borrower = h.add_member("0810", dec!(0)).await;
        h.add_member("0900", dec!(0)).await;
        h.pending_loan(&borrower, dec!(1000), 6, &["0900"]).await;

        let beyond = h
            .service
            .list_loans(ListLoansRequest {
                status: None,
                page_size: Some(20),
                page: Some(usize::MAX),
            })
            .await;
        assert!(matches!(beyond, Err(LendingError::Validation(_))));

        let last_allowed = h
            .service
            .list_loans(ListLoansRequest {
                status: None,
                page_size: Some(100),
                page: Some(100_000),
            })
            .await
            .unwrap();
        assert!(last_allowed.items.is_empty());
        assert_eq!(last_allowed.total, 1);
        assert!(!last_allowed.has_more());
    }

    #[tokio::test]
    async fn test_pending_surety_requests() {
        let h = TestHarness::new().await;
        let borrower = h.add_member("0801", dec!(0)).await;
        let surety = h.add_member("0802", dec!(0)).await;
        let loan = h.pending_loan(&borrower, dec!(1000), 6, &["0802"]).await;

        let waiting = h.service.pending_surety_requests(surety.id).await.unwrap();
        assert_eq!(waiting.len(), 1);
        assert_eq!(waiting[0].id, loan.id);

        h.respond(loan.id, surety.id, SuretyDecision::Approved).await;
        assert!(h.service.pending_surety_requests(surety.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_member_loans_newest_first() {
        let h = TestHarness::new().await;
        let borrower = h.add_member("0801", dec!(0)).await;
        h.add_member("0802", dec!(0)).await;
        let first = h.pending_loan(&borrower, dec!(1000), 6, &["0802"]).await;
        let second = h.pending_loan(&borrower, dec!(2000), 6, &["0802"]).await;

        let loans = h.service.member_loans(borrower.id).await.unwrap();
        let ids: Vec<Uuid> = loans.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_installment_plan_of_active_loan() {
        let h = TestHarness::new().await;
        let borrower = h.add_member("0801", dec!(0)).await;
        h.add_member("0802", dec!(0)).await;
        let pending = h.pending_loan(&borrower, dec!(100000), 12, &["0802"]).await;
        let early = h.service.installment_plan_for(pending.id).await;
        assert!(matches!(early, Err(LendingError::LoanNotActive(_))));
        h.reject(pending.id).await;

        let loan = h.active_loan(&borrower, dec!(100000), 12, "0802").await;
        let plan = h.service.installment_plan_for(loan.id).await.unwrap();
        assert_eq!(plan.len(), 12);
        assert_eq!(plan[0].due_date, loan.next_payment_date.unwrap());
        assert_eq!(plan[11].due_date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert_eq!(plan[11].balance_after, Decimal::ZERO);
        let total: Decimal = plan.iter().map(|i| i.payment).sum();
        assert!((total - loan.total_repayment.unwrap()).abs() < dec!(0.000001));
    }
}
