#![forbid(unsafe_code)]

use cr_storage::{CreateWorkspaceRequest, InsertNodeRequest, SqliteStore, StoreError};
use rusqlite::Connection;

#[test]
fn open_is_idempotent_on_an_existing_store() {
    let dir = tempfile::tempdir().expect("temp dir");
    {
        let mut store = SqliteStore::open(dir.path()).expect("first open");
        store
            .create_workspace(CreateWorkspaceRequest {
                name: "live".to_string(),
                base_workspace: None,
            })
            .expect("create workspace");
    }

    let store = SqliteStore::open(dir.path()).expect("second open");
    let rows = store.list_workspaces().expect("list workspaces");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "live");
    assert_eq!(rows[0].base_workspace, None);
}

#[test]
fn open_rejects_a_foreign_database() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("content_repository.db");
    let conn = Connection::open(&db_path).expect("open sqlite db");
    conn.execute_batch("CREATE TABLE something_else(id INTEGER PRIMARY KEY);")
        .expect("seed foreign schema");
    drop(conn);

    match SqliteStore::open(dir.path()) {
        Err(StoreError::Schema(_)) => {}
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn create_workspace_enforces_name_and_base_rules() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut store = SqliteStore::open(dir.path()).expect("open store");

    match store.create_workspace(CreateWorkspaceRequest {
        name: "bad name".to_string(),
        base_workspace: None,
    }) {
        Err(StoreError::InvalidInput(_)) => {}
        other => panic!("expected invalid input, got {other:?}"),
    }

    match store.create_workspace(CreateWorkspaceRequest {
        name: "draft".to_string(),
        base_workspace: Some("missing".to_string()),
    }) {
        Err(StoreError::UnknownWorkspace) => {}
        other => panic!("expected unknown workspace, got {other:?}"),
    }

    store
        .create_workspace(CreateWorkspaceRequest {
            name: "live".to_string(),
            base_workspace: None,
        })
        .expect("create live workspace");
    match store.create_workspace(CreateWorkspaceRequest {
        name: "live".to_string(),
        base_workspace: None,
    }) {
        Err(StoreError::WorkspaceAlreadyExists) => {}
        other => panic!("expected duplicate error, got {other:?}"),
    }
}

#[test]
fn insert_node_enforces_workspace_and_uniqueness() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut store = SqliteStore::open(dir.path()).expect("open store");

    match store.insert_node(InsertNodeRequest::bare("missing", "/sites/a", "X")) {
        Err(StoreError::UnknownWorkspace) => {}
        other => panic!("expected unknown workspace, got {other:?}"),
    }

    store
        .create_workspace(CreateWorkspaceRequest {
            name: "live".to_string(),
            base_workspace: None,
        })
        .expect("create live workspace");
    store
        .insert_node(InsertNodeRequest::bare("live", "/sites/a", "X"))
        .expect("insert node");

    // Same workspace, path and dimension context: the unique index rejects it.
    match store.insert_node(InsertNodeRequest::bare("live", "/sites/a", "Z")) {
        Err(StoreError::NodeAlreadyExists) => {}
        other => panic!("expected node conflict, got {other:?}"),
    }

    match store.insert_node(InsertNodeRequest::bare("live", "relative", "X")) {
        Err(StoreError::InvalidInput(_)) => {}
        other => panic!("expected invalid path, got {other:?}"),
    }
}
