//! Full-database backup and restore around a test.
//!
//! # Responsibility
//! - Capture the complete database (schema, rows, `user_version`) before a
//!   test mutates anything.
//! - Copy the capture back over the live database afterwards.
//!
//! # Invariants
//! - Snapshots are taken from a plain connection; no migration or pragma
//!   write happens before the copy.
//! - A failed restore poisons the database location; every later backup
//!   against it fails with `BackupError::Poisoned`.
//! - Snapshot files are removed when the snapshot is dropped.

use crate::config::ConnectionSettings;
use crate::db::DbError;
use log::{error, info};
use once_cell::sync::Lazy;
use rusqlite::backup::Progress;
use rusqlite::{Connection, DatabaseName};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use tempfile::TempPath;
use uuid::Uuid;

const SNAPSHOT_PREFIX: &str = "shopdata-backup-";
const SNAPSHOT_SUFFIX: &str = ".sqlite3";

static POISONED_LOCATIONS: Lazy<Mutex<HashSet<PathBuf>>> =
    Lazy::new(|| Mutex::new(HashSet::new()));

pub type BackupResult<T> = Result<T, BackupError>;

/// Errors from backup and restore.
#[derive(Debug)]
pub enum BackupError {
    /// SQLite failed while copying pages.
    Db(DbError),
    /// Snapshot file could not be created.
    Io(std::io::Error),
    /// In-memory databases are private to one connection.
    InMemoryDatabase,
    /// An earlier restore against this location failed.
    Poisoned(PathBuf),
    /// Snapshot was taken from another database.
    ForeignSnapshot { expected: PathBuf, actual: PathBuf },
}

impl Display for BackupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "backup file error: {err}"),
            Self::InMemoryDatabase => write!(f, "in-memory databases cannot be backed up"),
            Self::Poisoned(path) => write!(
                f,
                "an earlier restore of `{}` failed; refusing to run on polluted state",
                path.display()
            ),
            Self::ForeignSnapshot { expected, actual } => write!(
                f,
                "snapshot of `{}` cannot be restored into `{}`",
                actual.display(),
                expected.display()
            ),
        }
    }
}

impl Error for BackupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::InMemoryDatabase | Self::Poisoned(_) | Self::ForeignSnapshot { .. } => None,
        }
    }
}

impl From<DbError> for BackupError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for BackupError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<std::io::Error> for BackupError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Temporary full copy of one database.
#[derive(Debug)]
pub struct BackupSnapshot {
    id: Uuid,
    source: PathBuf,
    file: TempPath,
}

impl BackupSnapshot {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Database the snapshot was taken from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Location of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.file
    }
}

/// Snapshot/restore envelope for one database location.
#[derive(Debug, Clone)]
pub struct BackupService {
    settings: ConnectionSettings,
}

impl BackupService {
    pub fn new(settings: ConnectionSettings) -> Self {
        Self { settings }
    }

    /// Returns whether a restore against this location has failed before.
    pub fn is_poisoned(&self) -> bool {
        POISONED_LOCATIONS
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&self.settings.data_source)
    }

    /// Copies the whole database into a new temporary snapshot file.
    ///
    /// # Errors
    /// - `Poisoned` when an earlier restore of this location failed.
    /// - `InMemoryDatabase` for `:memory:` data sources.
    pub fn create_database_backup(&self) -> BackupResult<BackupSnapshot> {
        self.ensure_file_backed()?;
        if self.is_poisoned() {
            return Err(BackupError::Poisoned(self.settings.data_source.clone()));
        }

        let started_at = Instant::now();
        let conn = self.open_plain()?;
        let file = tempfile::Builder::new()
            .prefix(SNAPSHOT_PREFIX)
            .suffix(SNAPSHOT_SUFFIX)
            .tempfile()?
            .into_temp_path();

        conn.backup(DatabaseName::Main, &file, None)?;

        let snapshot = BackupSnapshot {
            id: Uuid::new_v4(),
            source: self.settings.data_source.clone(),
            file,
        };
        info!(
            "event=db_backup module=fixtures status=ok backup_id={} duration_ms={}",
            snapshot.id,
            started_at.elapsed().as_millis()
        );
        Ok(snapshot)
    }

    /// Returns the database to exactly the state captured in `snapshot`.
    ///
    /// Any failure poisons this location before the error is returned.
    pub fn restore_database_backup(&self, snapshot: &BackupSnapshot) -> BackupResult<()> {
        if snapshot.source != self.settings.data_source {
            return Err(BackupError::ForeignSnapshot {
                expected: self.settings.data_source.clone(),
                actual: snapshot.source.clone(),
            });
        }

        let started_at = Instant::now();
        match self.restore_pages(snapshot) {
            Ok(()) => {
                info!(
                    "event=db_restore module=fixtures status=ok backup_id={} duration_ms={}",
                    snapshot.id,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                self.poison();
                error!(
                    "event=db_restore module=fixtures status=error backup_id={} error_code=restore_failed error={}",
                    snapshot.id, err
                );
                Err(err)
            }
        }
    }

    fn restore_pages(&self, snapshot: &BackupSnapshot) -> BackupResult<()> {
        let mut conn = self.open_plain()?;
        conn.restore(DatabaseName::Main, snapshot.path(), None::<fn(Progress)>)?;
        Ok(())
    }

    fn open_plain(&self) -> BackupResult<Connection> {
        let conn = Connection::open(&self.settings.data_source)?;
        conn.busy_timeout(self.settings.busy_timeout)?;
        Ok(conn)
    }

    fn ensure_file_backed(&self) -> BackupResult<()> {
        if self.settings.is_in_memory() {
            return Err(BackupError::InMemoryDatabase);
        }
        Ok(())
    }

    fn poison(&self) {
        POISONED_LOCATIONS
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(self.settings.data_source.clone());
    }
}
