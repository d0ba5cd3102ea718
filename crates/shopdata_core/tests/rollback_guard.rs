use shopdata_core::db::{open_db, open_db_in_memory};
use shopdata_core::fixtures::{reset_on, RollbackGuard};
use shopdata_core::{ConnectionSettings, Product, ProductRepository, Repository};

#[test]
fn writes_through_guard_are_discarded_on_drop() {
    let mut conn = open_db_in_memory().unwrap();
    reset_on(&conn).unwrap();

    {
        let guard = RollbackGuard::begin(&mut conn).unwrap();
        let repo = ProductRepository::try_new(&guard).unwrap();
        repo.create(&Product::with_id(2, "Fish2", 1, 1, 1)).unwrap();
        repo.update(&Product::with_id(1, "Fish3", 1, 1, 1)).unwrap();
        assert_eq!(repo.get_all().unwrap().len(), 2);
    }

    let repo = ProductRepository::try_new(&conn).unwrap();
    assert_eq!(
        repo.get_all().unwrap(),
        vec![Product::with_id(1, "Fish", 1, 1, 1)]
    );
}

#[test]
fn fixture_seeded_inside_guard_leaves_no_trace() {
    let dir = tempfile::tempdir().unwrap();
    let settings = ConnectionSettings::for_path(dir.path().join("shop.sqlite3"));
    let mut conn = open_db(&settings).unwrap();

    let guard = RollbackGuard::begin(&mut conn).unwrap();
    reset_on(&guard).unwrap();
    let repo = ProductRepository::try_new(&guard).unwrap();
    repo.delete(1).unwrap();
    assert!(repo.get_all().unwrap().is_empty());
    drop(repo);
    guard.rollback().unwrap();

    let repo = ProductRepository::try_new(&conn).unwrap();
    assert!(repo.get_all().unwrap().is_empty());
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM Towns;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}
