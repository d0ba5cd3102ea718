//! Table mappings between entities and SQLite rows.
//!
//! # Invariants
//! - `COLUMNS` lists every non-identity column in the order `column_values`
//!   returns them.
//! - Identifiers are compile-time constants; only values are bound.

use crate::model::brand::Brand;
use crate::model::product::Product;
use crate::model::product_type::ProductType;
use crate::model::town::Town;
use crate::model::Entity;
use rusqlite::types::Value;
use rusqlite::Row;

/// Describes how one entity type is stored in one table.
pub trait TableMapping: Entity + Sized {
    /// Table holding rows of this entity.
    const TABLE: &'static str;
    /// Identity column.
    const ID_COLUMN: &'static str = "Id";
    /// Non-identity columns, in binding order.
    const COLUMNS: &'static [&'static str];

    /// Values for `COLUMNS`, in the same order.
    fn column_values(&self) -> Vec<Value>;

    /// Builds an entity from a row selected with `select_sql`.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

impl TableMapping for Product {
    const TABLE: &'static str = "Products";
    const COLUMNS: &'static [&'static str] = &["Name", "Quantity", "TypeId", "BrandId"];

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Integer(self.quantity),
            Value::Integer(self.type_id),
            Value::Integer(self.brand_id),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("Id")?,
            name: row.get("Name")?,
            quantity: row.get("Quantity")?,
            type_id: row.get("TypeId")?,
            brand_id: row.get("BrandId")?,
        })
    }
}

impl TableMapping for Brand {
    const TABLE: &'static str = "Brands";
    const COLUMNS: &'static [&'static str] = &["Name", "TownId"];

    fn column_values(&self) -> Vec<Value> {
        vec![Value::Text(self.name.clone()), Value::Integer(self.town_id)]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("Id")?,
            name: row.get("Name")?,
            town_id: row.get("TownId")?,
        })
    }
}

impl TableMapping for ProductType {
    const TABLE: &'static str = "ProductTypes";
    const COLUMNS: &'static [&'static str] = &["Name"];

    fn column_values(&self) -> Vec<Value> {
        vec![Value::Text(self.name.clone())]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("Id")?,
            name: row.get("Name")?,
        })
    }
}

impl TableMapping for Town {
    const TABLE: &'static str = "Towns";
    const COLUMNS: &'static [&'static str] = &["Name"];

    fn column_values(&self) -> Vec<Value> {
        vec![Value::Text(self.name.clone())]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("Id")?,
            name: row.get("Name")?,
        })
    }
}

/// `SELECT Id, <columns> FROM <table>` without a trailing clause.
pub(crate) fn select_sql<T: TableMapping>() -> String {
    let columns = std::iter::once(T::ID_COLUMN)
        .chain(T::COLUMNS.iter().copied())
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(", ");
    format!("SELECT {columns} FROM {}", quote_ident(T::TABLE))
}

/// `INSERT` statement, including the identity column when `with_id` is set.
///
/// Placeholders are numbered from `?1`; the identity (if any) binds first.
pub(crate) fn insert_sql<T: TableMapping>(with_id: bool) -> String {
    let mut columns: Vec<&str> = Vec::with_capacity(T::COLUMNS.len() + 1);
    if with_id {
        columns.push(T::ID_COLUMN);
    }
    columns.extend(T::COLUMNS.iter().copied());

    let names = columns
        .iter()
        .map(|column| quote_ident(column))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=columns.len())
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {} ({names}) VALUES ({placeholders});",
        quote_ident(T::TABLE)
    )
}

/// `UPDATE` of every column; the identity binds last.
pub(crate) fn update_sql<T: TableMapping>() -> String {
    let assignments = T::COLUMNS
        .iter()
        .enumerate()
        .map(|(index, column)| format!("{} = ?{}", quote_ident(column), index + 1))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "UPDATE {} SET {assignments} WHERE {} = ?{};",
        quote_ident(T::TABLE),
        quote_ident(T::ID_COLUMN),
        T::COLUMNS.len() + 1
    )
}

pub(crate) fn delete_sql<T: TableMapping>() -> String {
    format!(
        "DELETE FROM {} WHERE {} = ?1;",
        quote_ident(T::TABLE),
        quote_ident(T::ID_COLUMN)
    )
}

pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::{delete_sql, insert_sql, select_sql, update_sql};
    use crate::model::product::Product;
    use crate::model::town::Town;

    #[test]
    fn select_lists_identity_first() {
        assert_eq!(
            select_sql::<Product>(),
            "SELECT \"Id\", \"Name\", \"Quantity\", \"TypeId\", \"BrandId\" FROM \"Products\""
        );
    }

    #[test]
    fn insert_numbers_placeholders_with_and_without_identity() {
        assert_eq!(
            insert_sql::<Town>(false),
            "INSERT INTO \"Towns\" (\"Name\") VALUES (?1);"
        );
        assert_eq!(
            insert_sql::<Town>(true),
            "INSERT INTO \"Towns\" (\"Id\", \"Name\") VALUES (?1, ?2);"
        );
    }

    #[test]
    fn update_binds_identity_last() {
        assert_eq!(
            update_sql::<Product>(),
            "UPDATE \"Products\" SET \"Name\" = ?1, \"Quantity\" = ?2, \"TypeId\" = ?3, \"BrandId\" = ?4 WHERE \"Id\" = ?5;"
        );
    }

    #[test]
    fn delete_targets_identity() {
        assert_eq!(delete_sql::<Town>(), "DELETE FROM \"Towns\" WHERE \"Id\" = ?1;");
    }
}
