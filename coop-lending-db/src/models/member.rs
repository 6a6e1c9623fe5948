use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::hash_as_i64;

/// Partial view of a cooperative member account.
///
/// The lending core reads the balance for sufficiency checks and writes it on
/// disbursement (credit) and repayment (debit). The phone number is how
/// applicants name their sureties.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemberModel {
    pub id: Uuid,
    pub display_name: HeaplessString<100>,
    pub phone_number: HeaplessString<20>,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MemberModel {
    /// Stable lookup key for the phone number, used by index columns.
    pub fn phone_number_hash(&self) -> Result<i64, String> {
        hash_as_i64(&self.phone_number.as_str())
    }
}
