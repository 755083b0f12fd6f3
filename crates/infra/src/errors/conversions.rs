//! Conversions from external infrastructure errors into domain errors.

use costclose_common::storage::StorageError;
use costclose_domain::CostCloseError;
use rusqlite::Error as SqlError;
use tokio::task::JoinError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub CostCloseError);

impl From<InfraError> for CostCloseError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<CostCloseError> for InfraError {
    fn from(value: CostCloseError) -> Self {
        InfraError(value)
    }
}

trait IntoCostCloseError {
    fn into_costclose(self) -> CostCloseError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → CostCloseError */
/* -------------------------------------------------------------------------- */

impl IntoCostCloseError for SqlError {
    fn into_costclose(self) -> CostCloseError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        CostCloseError::Conflict("database is busy, retry the request".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        CostCloseError::Conflict("database is locked, retry the request".into())
                    }
                    // SQLITE_CONSTRAINT_UNIQUE / SQLITE_CONSTRAINT_PRIMARYKEY
                    (ErrorCode::ConstraintViolation, 2067 | 1555) => {
                        CostCloseError::Conflict("unique constraint violation".into())
                    }
                    // SQLITE_CONSTRAINT_FOREIGNKEY
                    (ErrorCode::ConstraintViolation, 787) => {
                        CostCloseError::InvalidInput("foreign key constraint violation".into())
                    }
                    _ => CostCloseError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => CostCloseError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(idx, _, cause) => CostCloseError::Database(format!(
                "failed to convert sqlite value in column {idx}: {cause}"
            )),
            RE::InvalidColumnType(_, name, ty) => {
                CostCloseError::Database(format!("invalid column type for {name}: {ty}"))
            }
            RE::Utf8Error(_) => {
                CostCloseError::Database("invalid UTF-8 returned from sqlite".into())
            }
            RE::InvalidParameterName(parameter_name) => {
                CostCloseError::Database(format!("invalid parameter name: {parameter_name}"))
            }
            RE::InvalidPath(path) => CostCloseError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            RE::InvalidQuery => CostCloseError::Database("invalid SQL query".into()),
            other => CostCloseError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_costclose())
    }
}

/* -------------------------------------------------------------------------- */
/* StorageError → CostCloseError */
/* -------------------------------------------------------------------------- */

impl IntoCostCloseError for StorageError {
    fn into_costclose(self) -> CostCloseError {
        match self {
            StorageError::Rusqlite(sql_err) => sql_err.into_costclose(),
            // Pool exhaustion and dropped connections clear up on their own
            transient if transient.is_retryable() => {
                CostCloseError::Conflict(format!("{transient}, retry the request"))
            }
            StorageError::InvalidConfig(message) => CostCloseError::Config(message),
            other => CostCloseError::Database(other.to_string()),
        }
    }
}

impl From<StorageError> for InfraError {
    fn from(value: StorageError) -> Self {
        InfraError(value.into_costclose())
    }
}

/// Shorthand used by repositories at `map_err` sites.
pub fn map_sql_error(err: SqlError) -> CostCloseError {
    InfraError::from(err).into()
}

/// Same for pooled storage errors; transient ones become a retryable `Conflict`.
pub fn map_storage_error(err: StorageError) -> CostCloseError {
    InfraError::from(err).into()
}

/// A blocking database task was cancelled or panicked.
pub fn map_join_error(err: JoinError) -> CostCloseError {
    if err.is_cancelled() {
        CostCloseError::Internal("database task cancelled".into())
    } else {
        CostCloseError::Internal(format!("database task panic: {err}"))
    }
}
