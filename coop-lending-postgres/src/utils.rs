use heapless::String as HeaplessString;
use sqlx::{postgres::PgRow, Row};
use std::error::Error;
use std::str::FromStr;

use coop_lending_db::repository::error::RepositoryError;

/// A trait for converting a database row into a model.
pub trait TryFromRow<R>: Sized {
    /// Performs the conversion.
    fn try_from_row(row: &R) -> Result<Self, Box<dyn Error + Send + Sync>>;
}

/// Retrieves a required `HeaplessString` from a row.
pub fn get_heapless_string<const N: usize>(
    row: &PgRow,
    col_name: &str,
) -> Result<HeaplessString<N>, Box<dyn Error + Send + Sync>> {
    let s: String = row.try_get(col_name)?;
    HeaplessString::from_str(&s)
        .map_err(|_| format!("Value for column '{col_name}' is too long (max {N} chars)").into())
}

/// Retrieves an optional `HeaplessString` from a row.
pub fn get_optional_heapless_string<const N: usize>(
    row: &PgRow,
    col_name: &str,
) -> Result<Option<HeaplessString<N>>, Box<dyn Error + Send + Sync>> {
    let s: Option<String> = row.try_get(col_name)?;
    s.map(|val| HeaplessString::from_str(&val))
        .transpose()
        .map_err(|_| format!("Value for column '{col_name}' is too long (max {N} chars)").into())
}

/// Convert every row, failing on the first row that does not decode
pub fn rows_into<T: TryFromRow<PgRow>>(rows: &[PgRow]) -> Result<Vec<T>, RepositoryError> {
    rows.iter()
        .map(|row| T::try_from_row(row).map_err(RepositoryError::Backend))
        .collect()
}

/// Name of the unique constraint a statement violated, if that is why it
/// failed
pub fn unique_violation(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => db_err.constraint(),
        _ => None,
    }
}
