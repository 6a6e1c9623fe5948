#[cfg(test)]
pub mod test_utils {
    use chrono::Utc;
    use coop_lending_db::models::member::MemberModel;
    use heapless::String as HeaplessString;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    pub fn create_test_member(phone: &str, balance: Decimal) -> MemberModel {
        MemberModel {
            id: Uuid::new_v4(),
            display_name: HeaplessString::try_from("Test Member").unwrap(),
            phone_number: HeaplessString::try_from(phone).unwrap(),
            balance,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Phone number not used by any other test run
    pub fn unique_phone() -> String {
        let digits = Uuid::new_v4().as_u128() % 10_000_000_000;
        format!("+234{digits:010}")
    }
}
