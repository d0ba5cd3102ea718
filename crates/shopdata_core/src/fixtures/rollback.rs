//! Transaction-per-test isolation.
//!
//! A lighter alternative to full backup/restore: work done through the guard
//! is discarded when it drops. Schema changes that SQLite cannot roll back
//! still need `BackupService`.

use crate::db::DbResult;
use log::debug;
use rusqlite::{Connection, DropBehavior, Transaction, TransactionBehavior};
use std::ops::Deref;

/// Open transaction that always rolls back.
pub struct RollbackGuard<'conn> {
    tx: Transaction<'conn>,
}

impl<'conn> RollbackGuard<'conn> {
    /// Begins an immediate transaction on `conn`.
    pub fn begin(conn: &'conn mut Connection) -> DbResult<Self> {
        let mut tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.set_drop_behavior(DropBehavior::Rollback);
        debug!("event=rollback_guard module=fixtures status=start");
        Ok(Self { tx })
    }

    /// Rolls back now and surfaces any error instead of swallowing it on drop.
    pub fn rollback(self) -> DbResult<()> {
        self.tx.rollback()?;
        debug!("event=rollback_guard module=fixtures status=ok");
        Ok(())
    }
}

impl Deref for RollbackGuard<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.tx
    }
}
