use shopdata_core::db::open_db;
use shopdata_core::fixtures::{
    delete_all_from_database, seed_all, BrandSeed, ProductSeed, TableSeed, TownSeed,
};
use shopdata_core::{ConnectionSettings, Product, ProductRepository, Repository};
use rusqlite::Connection;

fn settings_in(dir: &tempfile::TempDir) -> ConnectionSettings {
    ConnectionSettings::for_path(dir.path().join("shop.sqlite3"))
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| row.get(0))
        .unwrap()
}

#[test]
fn seed_all_fills_every_table_in_dependency_order() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(&dir);

    seed_all(&settings).unwrap();

    let conn = open_db(&settings).unwrap();
    for table in ["Towns", "Brands", "ProductTypes", "Products"] {
        assert_eq!(count(&conn, table), 1, "{table} should hold one fixture row");
    }
    let repo = ProductRepository::try_new(&conn).unwrap();
    assert_eq!(
        repo.get_all().unwrap(),
        vec![Product::with_id(1, "Fish", 1, 1, 1)]
    );
}

#[test]
fn fill_table_is_repeatable() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(&dir);
    seed_all(&settings).unwrap();

    assert_eq!(ProductSeed::fill_table(&settings).unwrap(), 1);
    assert_eq!(ProductSeed::fill_table(&settings).unwrap(), 1);

    let conn = open_db(&settings).unwrap();
    assert_eq!(count(&conn, "Products"), 1);
}

#[test]
fn delete_all_empties_every_table() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(&dir);
    seed_all(&settings).unwrap();

    delete_all_from_database(&settings).unwrap();

    let conn = open_db(&settings).unwrap();
    for table in ["Towns", "Brands", "ProductTypes", "Products"] {
        assert_eq!(count(&conn, table), 0);
    }
}

#[test]
fn seeding_dependent_before_parent_fails_on_foreign_key() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(&dir);

    let err = BrandSeed::fill_table(&settings).unwrap_err();
    assert_eq!(
        err.sqlite_code(),
        Some(rusqlite::ErrorCode::ConstraintViolation)
    );

    TownSeed::fill_table(&settings).unwrap();
    assert_eq!(BrandSeed::fill_table(&settings).unwrap(), 1);
}

#[test]
fn wiping_parent_with_dependents_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(&dir);
    seed_all(&settings).unwrap();

    assert!(TownSeed::fill_table(&settings).is_err());

    let conn = open_db(&settings).unwrap();
    assert_eq!(count(&conn, "Towns"), 1);
}
