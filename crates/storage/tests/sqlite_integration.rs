use std::sync::Arc;

use chrono::Duration;
use storage::repository::{InMemoryRepository, SessionRecord, SessionRepository, StorageError};
use storage::sqlite::SqliteRepository;
use storage::{SheetSource, Storage};
use tuition_core::SheetTable;
use tuition_core::model::{SessionToken, Student, StudentId};
use tuition_core::time::fixed_now;

fn student(id: &str, name: &str) -> Student {
    Student {
        student_id: StudentId::new(id),
        student_name: name.into(),
        ..Student::default()
    }
}

#[tokio::test]
async fn sqlite_roundtrip_persists_sessions() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_sessions?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let record = SessionRecord::for_student(&student("123", "Alice"), fixed_now());
    repo.insert_session(&record).await.expect("insert");

    let fetched = repo
        .get_session(&record.token)
        .await
        .expect("fetch")
        .expect("session present");
    assert_eq!(fetched, record);

    assert!(repo.delete_session(&record.token).await.expect("delete"));
    assert!(!repo.delete_session(&record.token).await.expect("delete again"));
    assert!(repo.get_session(&record.token).await.expect("fetch").is_none());
}

#[tokio::test]
async fn sqlite_rejects_duplicate_tokens() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_dup_sessions?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let first = SessionRecord {
        token: SessionToken::new("fixed-token"),
        student_id: StudentId::new("1"),
        student_name: "One".into(),
        created_at: fixed_now(),
    };
    let second = SessionRecord {
        student_id: StudentId::new("2"),
        created_at: fixed_now() + Duration::minutes(5),
        ..first.clone()
    };

    repo.insert_session(&first).await.expect("insert first");
    assert!(matches!(
        repo.insert_session(&second).await,
        Err(StorageError::Conflict)
    ));
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate_twice?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");
}

#[tokio::test]
async fn storage_sqlite_wires_sheets_and_sessions() {
    let sheets = InMemoryRepository::new();
    sheets
        .insert_tab(
            "students",
            SheetTable::from_values(vec![vec!["student_id".into()], vec!["42".into()]]),
        )
        .unwrap();

    let storage = Storage::sqlite(
        "sqlite:file:memdb_storage_wiring?mode=memory&cache=shared",
        Arc::new(sheets) as Arc<dyn SheetSource>,
    )
    .await
    .expect("storage");

    let table = storage.sheets.fetch_tab("students").await.expect("tab");
    assert_eq!(table.rows.len(), 1);

    let record = SessionRecord::for_student(&student("42", "Zed"), fixed_now());
    storage.sessions.insert_session(&record).await.expect("insert");
    assert!(storage.sessions.get_session(&record.token).await.expect("get").is_some());
}
