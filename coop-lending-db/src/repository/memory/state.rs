use std::collections::HashMap;
use uuid::Uuid;

use crate::models::ledger_entry::LedgerEntryModel;
use crate::models::loan::LoanModel;
use crate::models::member::MemberModel;

/// Everything the in-memory store holds
#[derive(Debug, Clone, Default)]
pub struct LendingState {
    pub members: HashMap<Uuid, MemberModel>,
    pub loans: HashMap<Uuid, LoanModel>,
    /// Loan ids in insertion order
    pub loan_sequence: Vec<Uuid>,
    pub ledger: Vec<LedgerEntryModel>,
}

impl LendingState {
    /// Loans newest first
    pub(crate) fn loans_newest_first(&self) -> impl Iterator<Item = &LoanModel> {
        self.loan_sequence
            .iter()
            .rev()
            .filter_map(|id| self.loans.get(id))
    }

    pub(crate) fn open_loan_of(&self, member_id: Uuid, except: Option<Uuid>) -> Option<&LoanModel> {
        self.loans.values().find(|loan| {
            loan.member_id == member_id && loan.status.is_open() && Some(loan.id) != except
        })
    }
}
