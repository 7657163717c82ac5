//! Conversion from libSQL client errors into [`SqliteError`].

use crate::domain::errors::SqliteError;

impl From<libsql::Error> for SqliteError {
    fn from(err: libsql::Error) -> Self {
        match err {
            libsql::Error::SqliteFailure(code, message) => Self::new(result_code_name(code), message),
            other => Self::new("UNKNOWN", other.to_string()),
        }
    }
}

/// Symbolic name of an engine result code.
///
/// Extended codes are reported by their primary code.
pub fn result_code_name(code: i32) -> String {
    let name = match code & 0xff {
        1 => "SQLITE_ERROR",
        2 => "SQLITE_INTERNAL",
        3 => "SQLITE_PERM",
        4 => "SQLITE_ABORT",
        5 => "SQLITE_BUSY",
        6 => "SQLITE_LOCKED",
        7 => "SQLITE_NOMEM",
        8 => "SQLITE_READONLY",
        9 => "SQLITE_INTERRUPT",
        10 => "SQLITE_IOERR",
        11 => "SQLITE_CORRUPT",
        12 => "SQLITE_NOTFOUND",
        13 => "SQLITE_FULL",
        14 => "SQLITE_CANTOPEN",
        15 => "SQLITE_PROTOCOL",
        17 => "SQLITE_SCHEMA",
        18 => "SQLITE_TOOBIG",
        19 => "SQLITE_CONSTRAINT",
        20 => "SQLITE_MISMATCH",
        21 => "SQLITE_MISUSE",
        22 => "SQLITE_NOLFS",
        23 => "SQLITE_AUTH",
        25 => "SQLITE_RANGE",
        26 => "SQLITE_NOTADB",
        _ => return format!("SQLITE_{code}"),
    };
    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_failure_keeps_message() {
        let err: SqliteError =
            libsql::Error::SqliteFailure(19, "UNIQUE constraint failed: users.email".to_string())
                .into();
        assert_eq!(err.code, "SQLITE_CONSTRAINT");
        assert_eq!(err.message, "UNIQUE constraint failed: users.email");
    }

    #[test]
    fn test_extended_code_maps_to_primary() {
        // SQLITE_CONSTRAINT_FOREIGNKEY
        assert_eq!(result_code_name(787), "SQLITE_CONSTRAINT");
        // SQLITE_BUSY_SNAPSHOT
        assert_eq!(result_code_name(517), "SQLITE_BUSY");
    }

    #[test]
    fn test_unknown_code_is_numbered() {
        assert_eq!(result_code_name(99), "SQLITE_99");
    }
}
