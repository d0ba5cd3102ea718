//! Per-table seed helpers.
//!
//! Each helper wipes its table unconditionally and inserts fixed literal rows
//! with their identities, so tests can refer to rows by id.

use crate::config::ConnectionSettings;
use crate::db::{open_db, DbResult};
use crate::model::Entity;
use crate::model::brand::Brand;
use crate::model::product::Product;
use crate::model::product_type::ProductType;
use crate::model::town::Town;
use crate::repo::mapping::{insert_sql, quote_ident, TableMapping};
use log::info;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

/// Tables wiped by `delete_all_from_database`, dependents first.
const WIPE_ORDER: &[&str] = &[
    Product::TABLE,
    ProductType::TABLE,
    Brand::TABLE,
    Town::TABLE,
];

/// Seed helper for one table.
pub trait TableSeed {
    type Row: TableMapping;

    /// Literal rows this helper inserts.
    fn rows() -> Vec<Self::Row>;

    /// Wipes the table and inserts `rows()` on an existing connection.
    ///
    /// Runs inside whatever transaction `conn` is already in.
    fn fill_table_on(conn: &Connection) -> DbResult<usize> {
        let table = <Self::Row as TableMapping>::TABLE;
        conn.execute(&format!("DELETE FROM {};", quote_ident(table)), [])?;

        let sql = insert_sql::<Self::Row>(true);
        let rows = Self::rows();
        for row in &rows {
            let mut values = row.column_values();
            values.insert(0, Value::Integer(row.id()));
            conn.execute(&sql, params_from_iter(values))?;
        }

        info!(
            "event=seed_fill module=fixtures status=ok table={} rows={}",
            table,
            rows.len()
        );
        Ok(rows.len())
    }

    /// Opens a connection and fills the table in a single transaction.
    fn fill_table(settings: &ConnectionSettings) -> DbResult<usize> {
        let mut conn = open_db(settings)?;
        let tx = conn.transaction()?;
        let inserted = Self::fill_table_on(&tx)?;
        tx.commit()?;
        Ok(inserted)
    }
}

pub struct TownSeed;

impl TableSeed for TownSeed {
    type Row = Town;

    fn rows() -> Vec<Town> {
        vec![Town::with_id(1, "Springfield")]
    }
}

pub struct BrandSeed;

impl TableSeed for BrandSeed {
    type Row = Brand;

    fn rows() -> Vec<Brand> {
        vec![Brand::with_id(1, "Acme", 1)]
    }
}

pub struct ProductTypeSeed;

impl TableSeed for ProductTypeSeed {
    type Row = ProductType;

    fn rows() -> Vec<ProductType> {
        vec![ProductType::with_id(1, "Food")]
    }
}

pub struct ProductSeed;

impl TableSeed for ProductSeed {
    type Row = Product;

    fn rows() -> Vec<Product> {
        vec![Product::with_id(1, "Fish", 1, 1, 1)]
    }
}

/// Deletes every row from all catalog tables, dependents first.
pub fn delete_all_from_database(settings: &ConnectionSettings) -> DbResult<()> {
    let mut conn = open_db(settings)?;
    let tx = conn.transaction()?;
    delete_all_on(&tx)?;
    tx.commit()?;
    Ok(())
}

/// Deletes every row from all catalog tables on an existing connection.
pub fn delete_all_on(conn: &Connection) -> DbResult<()> {
    for table in WIPE_ORDER {
        conn.execute(&format!("DELETE FROM {};", quote_ident(table)), [])?;
    }
    info!("event=seed_wipe module=fixtures status=ok tables={}", WIPE_ORDER.len());
    Ok(())
}

/// Fills every table in foreign-key order.
pub fn seed_all(settings: &ConnectionSettings) -> DbResult<()> {
    TownSeed::fill_table(settings)?;
    BrandSeed::fill_table(settings)?;
    ProductTypeSeed::fill_table(settings)?;
    ProductSeed::fill_table(settings)?;
    Ok(())
}

/// Wipes and fills every table on an existing connection.
pub fn reset_on(conn: &Connection) -> DbResult<()> {
    delete_all_on(conn)?;
    TownSeed::fill_table_on(conn)?;
    BrandSeed::fill_table_on(conn)?;
    ProductTypeSeed::fill_table_on(conn)?;
    ProductSeed::fill_table_on(conn)?;
    Ok(())
}
