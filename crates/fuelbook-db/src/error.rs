//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)        CoreError (domain rule)             │
//! │       │                                 │                               │
//! │       ▼                                 ▼                               │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ├── is_transient()? ── yes ──► retry_on_conflict tries again     │
//! │       ▼                                                                 │
//! │  ApiError (in HTTP app) ← Serialized for the client                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use fuelbook_core::CoreError;
use thiserror::Error;

/// SQLite result codes that mean "another writer got there first".
///
/// SQLITE_BUSY (5), SQLITE_LOCKED (6) and their extended forms
/// BUSY_RECOVERY (261), LOCKED_SHAREDCACHE (262), BUSY_SNAPSHOT (517).
const TRANSIENT_SQLITE_CODES: &[&str] = &["5", "6", "261", "262", "517"];

/// Database operation errors.
///
/// These errors wrap sqlx errors and domain rule violations and provide
/// additional context for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - ID doesn't exist
    /// - Entity belongs to a branch the caller cannot access
    /// - A bank or counterparty referenced by a ledger adjustment is missing
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - A second meter reading for one nozzle and day
    /// - Any UNIQUE index violation
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Another writer holds the lock. Safe to retry.
    ///
    /// ## When This Occurs
    /// - SQLITE_BUSY / SQLITE_LOCKED while committing
    /// - "database is locked"
    #[error("Write conflict: {0}")]
    Conflict(String),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// A domain rule rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Whether retrying the same unit of work may succeed.
    ///
    /// Only lock contention qualifies. Constraint violations, missing rows
    /// and domain rejections fail the same way every time.
    pub fn is_transient(&self) -> bool {
        matches!(self, DbError::Conflict(_))
    }
}

impl From<fuelbook_core::ValidationError> for DbError {
    fn from(err: fuelbook_core::ValidationError) -> Self {
        DbError::Core(CoreError::Validation(err))
    }
}

fn is_lock_contention(code: Option<&str>, message: &str) -> bool {
    code.is_some_and(|c| TRANSIENT_SQLITE_CODES.contains(&c))
        || message.contains("database is locked")
        || message.contains("database table is locked")
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Busy/locked → Conflict, else by constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                let code = db_err.code();

                if is_lock_contention(code.as_deref(), msg) {
                    DbError::Conflict(msg.to_string())
                } else if msg.contains("UNIQUE constraint failed") {
                    // "UNIQUE constraint failed: meter_readings.nozzle_id, meter_readings.day"
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_contention_detection() {
        assert!(is_lock_contention(Some("5"), "database is busy"));
        assert!(is_lock_contention(Some("517"), ""));
        assert!(is_lock_contention(None, "database is locked"));
        assert!(!is_lock_contention(Some("2067"), "UNIQUE constraint failed: x.y"));
        assert!(!is_lock_contention(None, "no such table: sales"));
    }

    #[test]
    fn test_only_conflicts_are_transient() {
        assert!(DbError::Conflict("database is locked".into()).is_transient());
        assert!(!DbError::not_found("Sale", "s-1").is_transient());
        assert!(!DbError::duplicate("nozzle_id", "n-1").is_transient());
        assert!(!DbError::Core(CoreError::EmptyBatch).is_transient());
        assert!(!DbError::PoolExhausted.is_transient());
    }
}
