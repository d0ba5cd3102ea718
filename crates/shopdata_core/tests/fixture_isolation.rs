use shopdata_core::db::open_db;
use shopdata_core::fixtures::{BackupError, BackupService, FixtureError, FixtureHarness};
use shopdata_core::{
    ConnectionSettings, Product, Repository, ScopedRepository, Town, TownRepository,
};
use rusqlite::Connection;
use std::path::Path;

/// Puts non-fixture rows in place so restores have something to bring back.
fn prepare_existing_database(path: &Path) -> ConnectionSettings {
    let settings = ConnectionSettings::for_path(path);
    let conn = open_db(&settings).unwrap();
    conn.execute_batch(
        "INSERT INTO Towns (Id, Name) VALUES (10, 'Ogdenville');
         INSERT INTO Brands (Id, Name, TownId) VALUES (10, 'Monorail Inc', 10);
         INSERT INTO ProductTypes (Id, Name) VALUES (10, 'Transport');
         INSERT INTO Products (Id, Name, Quantity, TypeId, BrandId)
             VALUES (10, 'Monorail', 3, 10, 10);",
    )
    .unwrap();
    settings
}

fn dump(settings: &ConnectionSettings) -> Vec<String> {
    let conn = Connection::open(&settings.data_source).unwrap();
    let mut lines = Vec::new();
    for table in ["Towns", "Brands", "ProductTypes", "Products"] {
        let mut stmt = conn
            .prepare(&format!("SELECT * FROM {table} ORDER BY Id;"))
            .unwrap();
        let columns = stmt.column_count();
        let mut rows = stmt.query([]).unwrap();
        while let Some(row) = rows.next().unwrap() {
            let values: Vec<String> = (0..columns)
                .map(|index| format!("{:?}", row.get_ref(index).unwrap()))
                .collect();
            lines.push(format!("{table}: {}", values.join(", ")));
        }
    }
    lines
}

#[test]
fn set_up_replaces_existing_rows_with_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let settings = prepare_existing_database(&dir.path().join("shop.sqlite3"));

    let harness = FixtureHarness::set_up(settings).unwrap();
    let towns: ScopedRepository<Town> = harness.repository();

    assert_eq!(towns.get_all().unwrap(), vec![Town::with_id(1, "Springfield")]);
    harness.tear_down().unwrap();
}

#[test]
fn tear_down_reverts_every_row_change() {
    let dir = tempfile::tempdir().unwrap();
    let settings = prepare_existing_database(&dir.path().join("shop.sqlite3"));
    let before = dump(&settings);

    let harness = FixtureHarness::set_up(settings.clone()).unwrap();
    let products: ScopedRepository<Product> = harness.repository();
    products.create(&Product::with_id(2, "Fish2", 1, 1, 1)).unwrap();
    products.update(&Product::with_id(1, "Fish3", 9, 1, 1)).unwrap();
    products.delete(2).unwrap();
    harness.tear_down().unwrap();

    assert_eq!(dump(&settings), before);
}

#[test]
fn tear_down_restores_dropped_table() {
    let dir = tempfile::tempdir().unwrap();
    let settings = prepare_existing_database(&dir.path().join("shop.sqlite3"));
    let before = dump(&settings);

    let harness = FixtureHarness::set_up(settings.clone()).unwrap();
    let conn = harness.open().unwrap();
    conn.execute_batch("DROP TABLE Products;").unwrap();
    drop(conn);
    harness.tear_down().unwrap();

    assert_eq!(dump(&settings), before);
    let conn = open_db(&settings).unwrap();
    let towns = TownRepository::try_new(&conn).unwrap();
    assert_eq!(towns.get(10).unwrap(), Town::with_id(10, "Ogdenville"));
}

#[test]
fn dropping_harness_without_tear_down_still_restores() {
    let dir = tempfile::tempdir().unwrap();
    let settings = prepare_existing_database(&dir.path().join("shop.sqlite3"));
    let before = dump(&settings);

    {
        let harness = FixtureHarness::set_up(settings.clone()).unwrap();
        let products: ScopedRepository<Product> = harness.repository();
        products.create(&Product::new("Crab", 4, 1, 1)).unwrap();
    }

    assert_eq!(dump(&settings), before);
}

#[test]
fn running_suite_twice_gives_identical_results() {
    let dir = tempfile::tempdir().unwrap();
    let settings = prepare_existing_database(&dir.path().join("shop.sqlite3"));
    let before = dump(&settings);

    let first = run_suite(&settings);
    let second = run_suite(&settings);

    assert_eq!(first, second);
    assert_eq!(dump(&settings), before);
}

fn run_suite(settings: &ConnectionSettings) -> Vec<Vec<Product>> {
    let mut observed = Vec::new();

    let harness = FixtureHarness::set_up(settings.clone()).unwrap();
    let repo: ScopedRepository<Product> = harness.repository();
    repo.create(&Product::with_id(2, "Fish2", 1, 1, 1)).unwrap();
    observed.push(repo.get_all().unwrap());
    harness.tear_down().unwrap();

    let harness = FixtureHarness::set_up(settings.clone()).unwrap();
    let repo: ScopedRepository<Product> = harness.repository();
    repo.update(&Product::with_id(1, "Fish3", 1, 1, 1)).unwrap();
    observed.push(repo.get_all().unwrap());
    harness.tear_down().unwrap();

    let harness = FixtureHarness::set_up(settings.clone()).unwrap();
    let repo: ScopedRepository<Product> = harness.repository();
    repo.create(&Product::new("Squid", 2, 1, 1)).unwrap();
    observed.push(repo.get_all().unwrap());
    harness.tear_down().unwrap();

    observed
}

#[test]
fn failed_restore_poisons_location_for_later_backups() {
    let dir = tempfile::tempdir().unwrap();
    let settings = prepare_existing_database(&dir.path().join("shop.sqlite3"));
    let service = BackupService::new(settings.clone());

    let snapshot = service.create_database_backup().unwrap();
    std::fs::write(snapshot.path(), b"definitely not a sqlite database").unwrap();

    assert!(!service.is_poisoned());
    assert!(service.restore_database_backup(&snapshot).is_err());
    assert!(service.is_poisoned());

    assert!(matches!(
        service.create_database_backup(),
        Err(BackupError::Poisoned(_))
    ));
    assert!(matches!(
        FixtureHarness::set_up(settings),
        Err(FixtureError::Backup(BackupError::Poisoned(_)))
    ));
}

#[test]
fn snapshot_cannot_be_restored_into_another_database() {
    let dir = tempfile::tempdir().unwrap();
    let first = prepare_existing_database(&dir.path().join("first.sqlite3"));
    let second = prepare_existing_database(&dir.path().join("second.sqlite3"));

    let snapshot = BackupService::new(first).create_database_backup().unwrap();
    let err = BackupService::new(second.clone())
        .restore_database_backup(&snapshot)
        .unwrap_err();

    assert!(matches!(err, BackupError::ForeignSnapshot { .. }));
    assert!(!BackupService::new(second).is_poisoned());
}

#[test]
fn in_memory_database_cannot_be_backed_up() {
    for source in [":memory:", "", "file::memory:"] {
        let service = BackupService::new(ConnectionSettings::for_path(source));

        assert!(
            matches!(
                service.create_database_backup(),
                Err(BackupError::InMemoryDatabase)
            ),
            "source {source:?} should be rejected"
        );
    }
}

#[test]
fn snapshot_file_is_removed_on_drop() {
    let dir = tempfile::tempdir().unwrap();
    let settings = prepare_existing_database(&dir.path().join("shop.sqlite3"));

    let snapshot = BackupService::new(settings).create_database_backup().unwrap();
    let path = snapshot.path().to_path_buf();
    assert!(path.exists());

    drop(snapshot);
    assert!(!path.exists());
}
