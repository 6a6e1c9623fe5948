use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use uuid::Uuid;

use crate::error::{LendingError, LendingResult};

pub const DISBURSEMENT_PREFIX: &str = "LND";
pub const REPAYMENT_PREFIX: &str = "LNR";

/// Fresh ledger reference, e.g. `LNR-20240120093000-1f0c2a9be4d5`
pub fn generate_reference(prefix: &str, at: DateTime<Utc>) -> HeaplessString<64> {
    let suffix = Uuid::new_v4().simple().to_string();
    let text = format!("{prefix}-{}-{}", at.format("%Y%m%d%H%M%S"), &suffix[..12]);
    text.chars().filter(char::is_ascii).take(64).collect()
}

/// Copy of `text` cut to the capacity of the target string
pub fn bounded_text<const N: usize>(text: &str) -> HeaplessString<N> {
    let mut bounded = HeaplessString::new();
    for ch in text.chars() {
        if bounded.push(ch).is_err() {
            break;
        }
    }
    bounded
}

/// Accept a caller-supplied reference, trimmed and non-empty
pub fn parse_reference(text: &str) -> LendingResult<HeaplessString<64>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(LendingError::Validation("reference is blank".to_string()));
    }
    HeaplessString::try_from(trimmed)
        .map_err(|_| LendingError::Validation(format!("reference too long: {text}")))
}
