//! Generic entity repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide uniform CRUD APIs over any table described by `TableMapping`.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Entity::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `get`, `update` and `delete` report a missing row as `NotFound`.
//! - Every operation is a single statement; there is no cross-call transaction.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::brand::Brand;
use crate::model::product::Product;
use crate::model::product_type::ProductType;
use crate::model::town::Town;
use crate::model::{EntityId, ValidationError};
use crate::repo::mapping::{delete_sql, insert_sql, select_sql, update_sql, TableMapping};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by every entity type.
#[derive(Debug)]
pub enum RepoError {
    /// Entity failed field-level validation before a write.
    Validation(ValidationError),
    /// Store-level failure, including constraint violations, left untranslated.
    Db(DbError),
    /// No row with this identity exists in `table`.
    NotFound { table: &'static str, id: EntityId },
    /// Persisted row cannot be converted into a valid entity.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    /// Returns whether this error reports a missing row.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns whether the store rejected the statement on a constraint
    /// (duplicate identity, missing foreign key, `NOT NULL`).
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            Self::Db(err) => err.sqlite_code() == Some(rusqlite::ErrorCode::ConstraintViolation),
            _ => false,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { table, id } => write!(f, "row not found in {table}: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. }
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Uniform CRUD contract for one entity type.
pub trait Repository<T> {
    /// Returns every row of the table, ordered by identity.
    fn get_all(&self) -> RepoResult<Vec<T>>;
    /// Returns the row with identity `id`, or `NotFound`.
    fn get(&self, id: EntityId) -> RepoResult<T>;
    /// Inserts `item` and returns its identity.
    ///
    /// Unsaved items (`id == 0`) get a store-assigned identity.
    fn create(&self, item: &T) -> RepoResult<EntityId>;
    /// Overwrites the row matching `item`'s identity, or returns `NotFound`.
    fn update(&self, item: &T) -> RepoResult<()>;
    /// Removes the row with identity `id`, or returns `NotFound`.
    fn delete(&self, id: EntityId) -> RepoResult<()>;
}

/// SQLite-backed repository over a borrowed connection.
pub struct SqliteRepository<'conn, T> {
    conn: &'conn Connection,
    _entity: PhantomData<fn() -> T>,
}

pub type ProductRepository<'conn> = SqliteRepository<'conn, Product>;
pub type BrandRepository<'conn> = SqliteRepository<'conn, Brand>;
pub type ProductTypeRepository<'conn> = SqliteRepository<'conn, ProductType>;
pub type TownRepository<'conn> = SqliteRepository<'conn, Town>;

impl<'conn, T: TableMapping> SqliteRepository<'conn, T> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when schema version is not latest.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when `T`'s table
    ///   does not match its mapping.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready::<T>(conn)?;
        Ok(Self {
            conn,
            _entity: PhantomData,
        })
    }
}

impl<T: TableMapping> Repository<T> for SqliteRepository<'_, T> {
    fn get_all(&self) -> RepoResult<Vec<T>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} ORDER BY \"{}\" ASC;",
            select_sql::<T>(),
            T::ID_COLUMN
        ))?;

        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_row::<T>(row)?);
        }

        Ok(items)
    }

    fn get(&self, id: EntityId) -> RepoResult<T> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE \"{}\" = ?1;",
            select_sql::<T>(),
            T::ID_COLUMN
        ))?;

        let row = stmt
            .query_row([id], |row| Ok(parse_row::<T>(row)))
            .optional()?;

        match row {
            Some(item) => item,
            None => Err(RepoError::NotFound { table: T::TABLE, id }),
        }
    }

    fn create(&self, item: &T) -> RepoResult<EntityId> {
        item.validate()?;

        let mut values = item.column_values();
        if item.is_unsaved() {
            self.conn
                .execute(&insert_sql::<T>(false), params_from_iter(values))?;
            return Ok(self.conn.last_insert_rowid());
        }

        values.insert(0, Value::Integer(item.id()));
        self.conn
            .execute(&insert_sql::<T>(true), params_from_iter(values))?;
        Ok(item.id())
    }

    fn update(&self, item: &T) -> RepoResult<()> {
        item.validate()?;

        let mut values = item.column_values();
        values.push(Value::Integer(item.id()));
        let changed = self
            .conn
            .execute(&update_sql::<T>(), params_from_iter(values))?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                table: T::TABLE,
                id: item.id(),
            });
        }

        Ok(())
    }

    fn delete(&self, id: EntityId) -> RepoResult<()> {
        let changed = self.conn.execute(&delete_sql::<T>(), [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound { table: T::TABLE, id });
        }

        Ok(())
    }
}

fn parse_row<T: TableMapping>(row: &Row<'_>) -> RepoResult<T> {
    let item = T::from_row(row)?;
    item.validate().map_err(|err| {
        RepoError::InvalidData(format!("{} row {}: {err}", T::TABLE, item.id()))
    })?;
    Ok(item)
}

fn ensure_connection_ready<T: TableMapping>(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, T::TABLE)? {
        return Err(RepoError::MissingRequiredTable(T::TABLE));
    }

    for column in std::iter::once(T::ID_COLUMN).chain(T::COLUMNS.iter().copied()) {
        if !table_has_column(conn, T::TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: T::TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM pragma_table_info(?1)
            WHERE name = ?2
        );",
        [table, column],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
