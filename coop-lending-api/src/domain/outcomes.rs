use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use coop_lending_db::models::ledger_entry::LedgerEntryModel;
use coop_lending_db::models::loan::LoanModel;

/// Result of an accepted repayment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepaymentOutcome {
    pub loan: LoanModel,
    /// Borrower balance after the debit
    pub new_balance: Decimal,
    pub ledger_entry: LedgerEntryModel,
}

/// Result of a dispatched `LendingCommand`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LendingOutcome {
    Loan(LoanModel),
    SuretyRecorded,
    Repayment(RepaymentOutcome),
}
