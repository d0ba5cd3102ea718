//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas from `ConnectionSettings`.
//! - Trigger schema migrations before returning a usable connection.
//!
//! # Invariants
//! - Returned connections honor `settings.foreign_keys`.
//! - Returned connections have migrations fully applied.

use super::migrations::apply_migrations;
use super::DbResult;
use crate::config::ConnectionSettings;
use log::{debug, error};
use rusqlite::Connection;
use std::time::{Duration, Instant};

const IN_MEMORY_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the database named by `settings` and applies pending migrations.
///
/// The connection closes when the returned value is dropped.
///
/// # Side effects
/// - Creates the database file when it does not exist yet.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(settings: &ConnectionSettings) -> DbResult<Connection> {
    let started_at = Instant::now();
    debug!(
        "event=db_open module=db status=start mode=file data_source={}",
        settings.data_source.display()
    );

    let mut conn = match Connection::open(&settings.data_source) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=file duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn, settings.foreign_keys, settings.busy_timeout) {
        Ok(()) => {
            debug!(
                "event=db_open module=db status=ok mode=file duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=file duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Opens a private in-memory database with foreign keys on and the schema
/// applied.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();

    let mut conn = Connection::open_in_memory()?;
    match bootstrap_connection(&mut conn, true, IN_MEMORY_BUSY_TIMEOUT) {
        Ok(()) => {
            debug!(
                "event=db_open module=db status=ok mode=memory duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=memory duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(
    conn: &mut Connection,
    foreign_keys: bool,
    busy_timeout: Duration,
) -> DbResult<()> {
    let pragma = if foreign_keys { "ON" } else { "OFF" };
    conn.execute_batch(&format!("PRAGMA foreign_keys = {pragma};"))?;
    conn.busy_timeout(busy_timeout)?;
    apply_migrations(conn)?;
    Ok(())
}
