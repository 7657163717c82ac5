//! Query results that report [`SqliteError`] instead of client errors.

use libsql::Value;

use crate::domain::errors::SqliteError;

/// Rows returned by a query, read one at a time.
pub struct Rows {
    inner: libsql::Rows,
}

impl Rows {
    pub(crate) const fn new(inner: libsql::Rows) -> Self {
        Self { inner }
    }

    /// Next row, or `None` once the result set is exhausted.
    pub async fn next(&mut self) -> Result<Option<Row>, SqliteError> {
        Ok(self.inner.next().await?.map(|inner| Row { inner }))
    }

    pub fn column_count(&self) -> i32 {
        self.inner.column_count()
    }

    pub fn column_name(&self, idx: i32) -> Option<&str> {
        self.inner.column_name(idx)
    }
}

impl std::fmt::Debug for Rows {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rows")
            .field("columns", &self.column_count())
            .finish_non_exhaustive()
    }
}

/// A single result row.
pub struct Row {
    inner: libsql::Row,
}

impl Row {
    /// Read column `idx` as `T`.
    pub fn get<T: FromColumn>(&self, idx: i32) -> Result<T, SqliteError> {
        T::from_column(self.get_value(idx)?)
    }

    /// Read column `idx` without conversion.
    pub fn get_value(&self, idx: i32) -> Result<Value, SqliteError> {
        Ok(self.inner.get_value(idx)?)
    }

    pub fn column_count(&self) -> i32 {
        self.inner.column_count()
    }
}

impl std::fmt::Debug for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Row")
            .field("columns", &self.column_count())
            .finish_non_exhaustive()
    }
}

/// Conversion from a column value.
pub trait FromColumn: Sized {
    fn from_column(value: Value) -> Result<Self, SqliteError>;
}

fn mismatch(expected: &str, value: &Value) -> SqliteError {
    SqliteError::new(
        "SQLITE_MISMATCH",
        format!("expected {expected}, found {value:?}"),
    )
}

impl FromColumn for Value {
    fn from_column(value: Value) -> Result<Self, SqliteError> {
        Ok(value)
    }
}

impl FromColumn for i64 {
    fn from_column(value: Value) -> Result<Self, SqliteError> {
        match value {
            Value::Integer(n) => Ok(n),
            other => Err(mismatch("integer", &other)),
        }
    }
}

impl FromColumn for u32 {
    fn from_column(value: Value) -> Result<Self, SqliteError> {
        let n = i64::from_column(value)?;
        Self::try_from(n).map_err(|_| mismatch("u32", &Value::Integer(n)))
    }
}

impl FromColumn for bool {
    fn from_column(value: Value) -> Result<Self, SqliteError> {
        Ok(i64::from_column(value)? != 0)
    }
}

impl FromColumn for f64 {
    fn from_column(value: Value) -> Result<Self, SqliteError> {
        match value {
            Value::Real(n) => Ok(n),
            #[allow(clippy::cast_precision_loss)]
            Value::Integer(n) => Ok(n as Self),
            other => Err(mismatch("real", &other)),
        }
    }
}

impl FromColumn for String {
    fn from_column(value: Value) -> Result<Self, SqliteError> {
        match value {
            Value::Text(text) => Ok(text),
            other => Err(mismatch("text", &other)),
        }
    }
}

impl FromColumn for Vec<u8> {
    fn from_column(value: Value) -> Result<Self, SqliteError> {
        match value {
            Value::Blob(bytes) => Ok(bytes),
            other => Err(mismatch("blob", &other)),
        }
    }
}

impl<T: FromColumn> FromColumn for Option<T> {
    fn from_column(value: Value) -> Result<Self, SqliteError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_column(other).map(Some),
        }
    }
}
