//! Error types shared by the table store, the query pipeline and the
//! transaction tracker.

use thiserror::Error;

use crate::transaction::TransactionStatus;

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;

/// Every failure the core can report to a caller.
///
/// Write paths check existence and uniqueness before touching any row, so an
/// error never leaves a partial mutation behind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DbError {
    /// The referenced table is absent.
    #[error("table not found in database: {0}")]
    TableNotFound(String),

    /// A table with this name already exists.
    #[error("table already exists in database: {0}")]
    TableExists(String),

    /// No row carries this id.
    #[error("ID not found in table: {id} in table {table}")]
    IdNotFound { table: String, id: String },

    /// A row with this id is already stored.
    #[error("ID already exists in table: {id} in table {table}")]
    IdExists { table: String, id: String },

    /// The query text (or a hand-built plan) is malformed.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Commit or rollback on a transaction that is no longer pending.
    #[error("transaction failed: transaction {id} is already {status:?}")]
    TransactionFailed { id: u32, status: TransactionStatus },

    #[error("invalid configuration: {0}")]
    Config(String),
}
