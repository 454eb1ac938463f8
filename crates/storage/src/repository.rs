use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tuition_core::SheetTable;
use tuition_core::model::{SessionToken, Student, StudentId};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("upstream returned status {0}")]
    Status(u16),
}

/// Persisted shape of a logged-in session.
///
/// Only the identity is cached; the student's sheet data is fetched fresh
/// whenever the session is resumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub token: SessionToken,
    pub student_id: StudentId,
    pub student_name: String,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    #[must_use]
    pub fn for_student(student: &Student, created_at: DateTime<Utc>) -> Self {
        Self {
            token: SessionToken::generate(),
            student_id: student.student_id.clone(),
            student_name: student.student_name.clone(),
            created_at,
        }
    }
}

/// Read access to named tabs of the backing spreadsheet.
#[async_trait]
pub trait SheetSource: Send + Sync {
    /// Fetch a whole tab: first row headers, remaining rows data.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the spreadsheet cannot be reached or decoded.
    async fn fetch_tab(&self, tab: &str) -> Result<SheetTable, StorageError>;
}

/// Repository contract for logged-in sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a new session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the token already exists, or other storage errors.
    async fn insert_session(&self, record: &SessionRecord) -> Result<(), StorageError>;

    /// Fetch a session by token.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lookup fails.
    async fn get_session(&self, token: &SessionToken)
    -> Result<Option<SessionRecord>, StorageError>;

    /// Delete a session; returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn delete_session(&self, token: &SessionToken) -> Result<bool, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tabs: Arc<Mutex<HashMap<String, SheetTable>>>,
    sessions: Arc<Mutex<HashMap<SessionToken, SessionRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tabs: Arc::new(Mutex::new(HashMap::new())),
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Replace the contents of a tab.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn insert_tab(&self, name: &str, table: SheetTable) -> Result<(), StorageError> {
        let mut guard = self
            .tabs
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(name.to_owned(), table);
        Ok(())
    }
}

#[async_trait]
impl SheetSource for InMemoryRepository {
    async fn fetch_tab(&self, tab: &str) -> Result<SheetTable, StorageError> {
        let guard = self
            .tabs
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(tab).cloned().ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn insert_session(&self, record: &SessionRecord) -> Result<(), StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard.contains_key(&record.token) {
            return Err(StorageError::Conflict);
        }
        guard.insert(record.token.clone(), record.clone());
        Ok(())
    }

    async fn get_session(
        &self,
        token: &SessionToken,
    ) -> Result<Option<SessionRecord>, StorageError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(token).cloned())
    }

    async fn delete_session(&self, token: &SessionToken) -> Result<bool, StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.remove(token).is_some())
    }
}

/// Aggregates the sheet source and session repository behind trait objects
/// for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub sheets: Arc<dyn SheetSource>,
    pub sessions: Arc<dyn SessionRepository>,
}

impl Storage {
    #[must_use]
    pub fn new(sheets: Arc<dyn SheetSource>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self { sheets, sessions }
    }

    /// In-memory storage; the returned repository is the handle for seeding tabs.
    #[must_use]
    pub fn in_memory() -> (Self, InMemoryRepository) {
        let repo = InMemoryRepository::new();
        let sheets: Arc<dyn SheetSource> = Arc::new(repo.clone());
        let sessions: Arc<dyn SessionRepository> = Arc::new(repo.clone());
        (Self { sheets, sessions }, repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuition_core::time::fixed_now;

    fn student(id: &str) -> Student {
        Student {
            student_id: StudentId::new(id),
            student_name: format!("Student {id}"),
            ..Student::default()
        }
    }

    #[tokio::test]
    async fn fetches_seeded_tab() {
        let repo = InMemoryRepository::new();
        let table = SheetTable::from_values(vec![vec!["student_id".into()], vec!["1".into()]]);
        repo.insert_tab("students", table.clone()).unwrap();

        assert_eq!(repo.fetch_tab("students").await.unwrap(), table);
        assert!(matches!(
            repo.fetch_tab("progress").await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn session_lifecycle() {
        let repo = InMemoryRepository::new();
        let record = SessionRecord::for_student(&student("7"), fixed_now());

        repo.insert_session(&record).await.unwrap();
        assert!(matches!(
            repo.insert_session(&record).await,
            Err(StorageError::Conflict)
        ));

        let fetched = repo.get_session(&record.token).await.unwrap();
        assert_eq!(fetched, Some(record.clone()));

        assert!(repo.delete_session(&record.token).await.unwrap());
        assert!(!repo.delete_session(&record.token).await.unwrap());
        assert_eq!(repo.get_session(&record.token).await.unwrap(), None);
    }
}
