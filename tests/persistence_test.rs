mod helpers;

use helpers::{new_entry, sqlite_service_at};

use cairn::db;
use cairn::knowledge::service::SearchOptions;

#[test]
fn entries_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("knowledge.db");

    let created = {
        let service = sqlite_service_at(&db_path);
        service
            .create("alice", new_entry("Durable note", "survives process restart"))
            .unwrap()
    };

    // Fresh service over the same file
    let service = sqlite_service_at(&db_path);
    let fetched = service.get("alice", &created.id).unwrap();
    assert_eq!(fetched.title, "Durable note");
    assert_eq!(fetched.embedding, created.embedding);

    let response = service
        .search("alice", "durable restart", &SearchOptions::default())
        .unwrap();
    assert!(response.results.iter().any(|r| r.entry.id == created.id));
}

#[test]
fn open_database_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("deeper").join("knowledge.db");

    let conn = db::open_database(&db_path).unwrap();
    drop(conn);
    assert!(db_path.exists());
}

#[test]
fn open_database_is_at_current_schema_version() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("knowledge.db");

    let conn = db::open_database(&db_path).unwrap();
    let version = db::migrations::get_schema_version(&conn).unwrap();
    assert_eq!(version, db::migrations::CURRENT_SCHEMA_VERSION);

    let provider = db::migrations::get_embedding_provider(&conn).unwrap();
    assert_eq!(
        provider.as_deref(),
        Some(db::migrations::EMBEDDING_PROVIDER_ID)
    );
}

#[test]
fn reopening_does_not_disturb_schema() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("knowledge.db");

    let conn = db::open_database(&db_path).unwrap();
    drop(conn);
    let conn = db::open_database(&db_path).unwrap();
    let version = db::migrations::get_schema_version(&conn).unwrap();
    assert_eq!(version, db::migrations::CURRENT_SCHEMA_VERSION);
}
