//! SQLite serialization for query keys
//!
//! Keys are stored in their canonical JSON form so prefix matching can be
//! done on the typed value after loading.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use super::key::QueryKey;

impl ToSql for QueryKey {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.canonical()))
    }
}

impl FromSql for QueryKey {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        QueryKey::from_canonical(s).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}
