use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Immutable entry in a loan's repayment history.
///
/// The reference is shared with the `loan_repayment` ledger entry written in
/// the same unit of work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepaymentModel {
    pub amount: Decimal,
    pub paid_at: DateTime<Utc>,
    pub reference: HeaplessString<64>,
}
