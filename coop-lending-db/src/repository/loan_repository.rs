use async_trait::async_trait;
use uuid::Uuid;

use crate::models::loan::{LoanModel, LoanStatus};
use crate::repository::error::RepositoryResult;
use crate::repository::pagination::{Page, PageRequest};

/// Loan record access.
///
/// Sureties and repayment history are persisted with their loan: `create_loan`
/// and `update_loan` write the whole aggregate. Implementations must refuse a
/// write that would leave a member with two loans in an open status
/// (`RepositoryError::OpenLoanExists`).
#[async_trait]
pub trait LoanRepository: Send + Sync {
    async fn create_loan(&self, loan: LoanModel) -> RepositoryResult<LoanModel>;

    /// Persist status, activation fields, surety statuses and any repayment
    /// entries not yet stored. Stored repayment entries are never rewritten.
    async fn update_loan(&self, loan: LoanModel) -> RepositoryResult<LoanModel>;

    /// Load a loan by id, locking it for the rest of the unit of work
    async fn find_loan_by_id(&self, id: Uuid) -> RepositoryResult<Option<LoanModel>>;

    /// The member's loan in an open status, if any
    async fn find_open_loan_by_member(&self, member_id: Uuid)
        -> RepositoryResult<Option<LoanModel>>;

    /// All loans of a member, newest first
    async fn find_loans_by_member(&self, member_id: Uuid) -> RepositoryResult<Vec<LoanModel>>;

    /// Pending loans on which the member is a surety that has not answered yet
    async fn find_loans_awaiting_surety(
        &self,
        surety_member_id: Uuid,
    ) -> RepositoryResult<Vec<LoanModel>>;

    /// Loans filtered by status (all when `None`), newest first
    async fn find_loans_by_status(
        &self,
        status: Option<LoanStatus>,
        page: PageRequest,
    ) -> RepositoryResult<Page<LoanModel>>;
}
