//! Transaction handles and their status transitions.
//!
//! ```text
//! Pending ──commit()──▶ Committed
//!    │
//!    └────rollback()──▶ RolledBack
//! ```
//!
//! A transaction only records its own status: no row changes are buffered
//! or undone.

use chrono::{DateTime, Timelike, Utc};

use crate::error::{DbError, DbResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Committed,
    RolledBack,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Nanosecond component of `started_at`. Not unique across rapid calls.
    pub id: u32,
    pub status: TransactionStatus,
    pub started_at: DateTime<Utc>,
}

impl Transaction {
    /// Opens a new pending transaction stamped with the current time.
    pub fn begin() -> Self {
        let started_at = Utc::now();
        Self {
            id: started_at.nanosecond(),
            status: TransactionStatus::Pending,
            started_at,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }

    /// # Errors
    /// Returns [DbError::TransactionFailed] unless the transaction is pending.
    pub fn commit(&mut self) -> DbResult<()> {
        self.finish(TransactionStatus::Committed)
    }

    /// # Errors
    /// Returns [DbError::TransactionFailed] unless the transaction is pending.
    pub fn rollback(&mut self) -> DbResult<()> {
        self.finish(TransactionStatus::RolledBack)
    }

    fn finish(&mut self, status: TransactionStatus) -> DbResult<()> {
        if !self.is_pending() {
            return Err(DbError::TransactionFailed {
                id: self.id,
                status: self.status,
            });
        }
        self.status = status;
        Ok(())
    }
}
