use async_trait::async_trait;
use heapless::String as HeaplessString;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

use super::state::LendingState;
use crate::models::ledger_entry::LedgerEntryModel;
use crate::models::loan::{LoanModel, LoanStatus};
use crate::models::member::MemberModel;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::ledger_repository::LedgerRepository;
use crate::repository::loan_repository::LoanRepository;
use crate::repository::member_repository::MemberRepository;
use crate::repository::pagination::{Page, PageRequest};
use crate::repository::unit_of_work::UnitOfWork;

/// Unit of work over the in-memory store.
///
/// Holds the store lock for its whole lifetime.
pub struct InMemorySession {
    committed: OwnedMutexGuard<LendingState>,
    working: Mutex<LendingState>,
}

impl InMemorySession {
    pub(super) fn new(committed: OwnedMutexGuard<LendingState>) -> Self {
        let working = Mutex::new(committed.clone());
        Self { committed, working }
    }
}

#[async_trait]
impl MemberRepository for InMemorySession {
    async fn create_member(&self, member: MemberModel) -> RepositoryResult<MemberModel> {
        let mut state = self.working.lock();
        if state
            .members
            .values()
            .any(|m| m.phone_number == member.phone_number)
        {
            return Err(format!("Phone number already registered: {}", member.phone_number).into());
        }
        state.members.insert(member.id, member.clone());
        Ok(member)
    }

    async fn find_member_by_id(&self, id: Uuid) -> RepositoryResult<Option<MemberModel>> {
        Ok(self.working.lock().members.get(&id).cloned())
    }

    async fn find_members_by_phone_numbers(
        &self,
        phone_numbers: &[String],
    ) -> RepositoryResult<Vec<MemberModel>> {
        let state = self.working.lock();
        Ok(phone_numbers
            .iter()
            .filter_map(|phone| {
                state
                    .members
                    .values()
                    .find(|m| m.phone_number.as_str() == phone.as_str())
                    .cloned()
            })
            .collect())
    }

    async fn update_member_balance(&self, id: Uuid, balance: Decimal) -> RepositoryResult<()> {
        let mut state = self.working.lock();
        let member = state
            .members
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(format!("member {id}")))?;
        member.balance = balance;
        Ok(())
    }
}

#[async_trait]
impl LoanRepository for InMemorySession {
    async fn create_loan(&self, loan: LoanModel) -> RepositoryResult<LoanModel> {
        let mut state = self.working.lock();
        if loan.status.is_open() && state.open_loan_of(loan.member_id, None).is_some() {
            return Err(RepositoryError::OpenLoanExists(loan.member_id));
        }
        state.loan_sequence.push(loan.id);
        state.loans.insert(loan.id, loan.clone());
        Ok(loan)
    }

    async fn update_loan(&self, loan: LoanModel) -> RepositoryResult<LoanModel> {
        let mut state = self.working.lock();
        let stored_repayments = state
            .loans
            .get(&loan.id)
            .map(|existing| existing.repayments.len())
            .ok_or_else(|| RepositoryError::NotFound(format!("loan {}", loan.id)))?;
        if loan.repayments.len() < stored_repayments {
            return Err(format!("Repayment history of loan {} is append-only", loan.id).into());
        }
        if loan.status.is_open() && state.open_loan_of(loan.member_id, Some(loan.id)).is_some() {
            return Err(RepositoryError::OpenLoanExists(loan.member_id));
        }
        state.loans.insert(loan.id, loan.clone());
        Ok(loan)
    }

    async fn find_loan_by_id(&self, id: Uuid) -> RepositoryResult<Option<LoanModel>> {
        Ok(self.working.lock().loans.get(&id).cloned())
    }

    async fn find_open_loan_by_member(
        &self,
        member_id: Uuid,
    ) -> RepositoryResult<Option<LoanModel>> {
        Ok(self.working.lock().open_loan_of(member_id, None).cloned())
    }

    async fn find_loans_by_member(&self, member_id: Uuid) -> RepositoryResult<Vec<LoanModel>> {
        let state = self.working.lock();
        Ok(state
            .loans_newest_first()
            .filter(|loan| loan.member_id == member_id)
            .cloned()
            .collect())
    }

    async fn find_loans_awaiting_surety(
        &self,
        surety_member_id: Uuid,
    ) -> RepositoryResult<Vec<LoanModel>> {
        let state = self.working.lock();
        Ok(state
            .loans_newest_first()
            .filter(|loan| loan.awaits_surety(surety_member_id))
            .cloned()
            .collect())
    }

    async fn find_loans_by_status(
        &self,
        status: Option<LoanStatus>,
        page: PageRequest,
    ) -> RepositoryResult<Page<LoanModel>> {
        let state = self.working.lock();
        let matching = state
            .loans_newest_first()
            .filter(|loan| status.map_or(true, |s| loan.status == s))
            .cloned()
            .collect();
        Ok(Page::from_sorted(matching, page))
    }
}

#[async_trait]
impl LedgerRepository for InMemorySession {
    async fn append_ledger_entry(
        &self,
        mut entry: LedgerEntryModel,
    ) -> RepositoryResult<LedgerEntryModel> {
        let mut state = self.working.lock();
        let reference = match entry.reference.take() {
            Some(reference) => reference,
            None => {
                let generated = format!("TXN-{}", Uuid::new_v4().simple());
                HeaplessString::try_from(generated.as_str())
                    .map_err(|_| format!("Generated reference too long: {generated}"))?
            }
        };
        if state
            .ledger
            .iter()
            .any(|e| e.reference.as_ref() == Some(&reference))
        {
            return Err(RepositoryError::DuplicateReference(reference.to_string()));
        }
        entry.reference = Some(reference);
        state.ledger.push(entry.clone());
        Ok(entry)
    }

    async fn find_ledger_entry_by_reference(
        &self,
        reference: &str,
    ) -> RepositoryResult<Option<LedgerEntryModel>> {
        Ok(self
            .working
            .lock()
            .ledger
            .iter()
            .find(|e| e.reference.as_deref() == Some(reference))
            .cloned())
    }

    async fn find_ledger_entries_by_member(
        &self,
        member_id: Uuid,
    ) -> RepositoryResult<Vec<LedgerEntryModel>> {
        Ok(self
            .working
            .lock()
            .ledger
            .iter()
            .filter(|e| e.member_id == member_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UnitOfWork for InMemorySession {
    async fn commit(self) -> RepositoryResult<()> {
        let InMemorySession {
            mut committed,
            working,
        } = self;
        *committed = working.into_inner();
        Ok(())
    }

    async fn rollback(self) -> RepositoryResult<()> {
        Ok(())
    }
}
