//! Per-test fixture envelope: snapshot, reset, run, restore.

use super::backup::{BackupError, BackupService, BackupSnapshot};
use super::seed::{delete_all_from_database, seed_all};
use crate::config::ConnectionSettings;
use crate::db::{open_db, DbError, DbResult};
use crate::repo::mapping::TableMapping;
use crate::repo::scoped_repo::ScopedRepository;
use log::error;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type FixtureResult<T> = Result<T, FixtureError>;

#[derive(Debug)]
pub enum FixtureError {
    Backup(BackupError),
    Db(DbError),
}

impl Display for FixtureError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backup(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FixtureError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Backup(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<BackupError> for FixtureError {
    fn from(value: BackupError) -> Self {
        Self::Backup(value)
    }
}

impl From<DbError> for FixtureError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Snapshot + seeded fixture for one test.
///
/// Dropping the harness without `tear_down` still restores the snapshot;
/// failures there are logged and poison the location.
pub struct FixtureHarness {
    settings: ConnectionSettings,
    backup: BackupService,
    snapshot: Option<BackupSnapshot>,
}

impl FixtureHarness {
    /// Backs up the database, wipes every table and seeds fixture rows.
    ///
    /// If seeding fails the snapshot is restored before the error returns.
    pub fn set_up(settings: ConnectionSettings) -> FixtureResult<Self> {
        let backup = BackupService::new(settings.clone());
        let snapshot = backup.create_database_backup()?;
        let harness = Self {
            settings,
            backup,
            snapshot: Some(snapshot),
        };

        delete_all_from_database(&harness.settings)?;
        seed_all(&harness.settings)?;
        Ok(harness)
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Opens a fresh migrated connection to the fixture database.
    pub fn open(&self) -> DbResult<Connection> {
        open_db(&self.settings)
    }

    /// Connection-per-call repository over the fixture database.
    pub fn repository<T: TableMapping>(&self) -> ScopedRepository<T> {
        ScopedRepository::new(self.settings.clone())
    }

    /// Restores the pre-test snapshot and reports the outcome.
    pub fn tear_down(mut self) -> FixtureResult<()> {
        match self.snapshot.take() {
            Some(snapshot) => Ok(self.backup.restore_database_backup(&snapshot)?),
            None => Ok(()),
        }
    }
}

impl Drop for FixtureHarness {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            if let Err(err) = self.backup.restore_database_backup(&snapshot) {
                error!(
                    "event=fixture_teardown module=fixtures status=error backup_id={} error={}",
                    snapshot.id(),
                    err
                );
            }
        }
    }
}
