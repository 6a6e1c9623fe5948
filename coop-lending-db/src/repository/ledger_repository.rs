use async_trait::async_trait;
use uuid::Uuid;

use crate::models::ledger_entry::LedgerEntryModel;
use crate::repository::error::RepositoryResult;

/// Append-only transaction ledger.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Persist an entry and return it as committed.
    ///
    /// Assigns a unique reference when the entry carries none and fails with
    /// `RepositoryError::DuplicateReference` when the reference is taken.
    async fn append_ledger_entry(&self, entry: LedgerEntryModel)
        -> RepositoryResult<LedgerEntryModel>;

    async fn find_ledger_entry_by_reference(
        &self,
        reference: &str,
    ) -> RepositoryResult<Option<LedgerEntryModel>>;

    /// Entries of a member in insertion order
    async fn find_ledger_entries_by_member(
        &self,
        member_id: Uuid,
    ) -> RepositoryResult<Vec<LedgerEntryModel>>;
}
