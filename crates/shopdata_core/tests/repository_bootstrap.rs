use shopdata_core::db::migrations::latest_version;
use shopdata_core::{ProductRepository, RepoError, TownRepository};
use rusqlite::Connection;

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match ProductRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = TownRepository::try_new(&conn);
    assert!(matches!(result, Err(RepoError::MissingRequiredTable("Towns"))));
}

#[test]
fn repository_rejects_table_missing_mapped_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE Products (
            Id INTEGER PRIMARY KEY NOT NULL,
            Name TEXT NOT NULL,
            Quantity INTEGER NOT NULL,
            TypeId INTEGER NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = ProductRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "Products",
            column: "BrandId"
        })
    ));
}

#[test]
fn not_found_error_names_table_and_id() {
    let err = RepoError::NotFound {
        table: "Products",
        id: 7,
    };
    assert_eq!(err.to_string(), "row not found in Products: 7");
    assert!(err.is_not_found());
    assert!(!err.is_constraint_violation());
}
