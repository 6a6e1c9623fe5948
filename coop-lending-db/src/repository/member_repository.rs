use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::member::MemberModel;
use crate::repository::error::RepositoryResult;

/// Member account access required by the lending core.
///
/// Reads made through a unit of work lock the member row until the unit of
/// work ends, so a read-compute-write on the balance cannot lose an update.
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Insert a new member account
    async fn create_member(&self, member: MemberModel) -> RepositoryResult<MemberModel>;

    /// Load a member by id
    ///
    /// # Returns
    /// * `Ok(Some(MemberModel))` - The member
    /// * `Ok(None)` - If no member has this id
    async fn find_member_by_id(&self, id: Uuid) -> RepositoryResult<Option<MemberModel>>;

    /// Resolve phone numbers to members. Numbers without a member are simply
    /// absent from the result; order follows the input.
    async fn find_members_by_phone_numbers(
        &self,
        phone_numbers: &[String],
    ) -> RepositoryResult<Vec<MemberModel>>;

    /// Overwrite the stored balance of a member
    async fn update_member_balance(&self, id: Uuid, balance: Decimal) -> RepositoryResult<()>;
}
