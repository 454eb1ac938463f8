use tuition_core::model::SessionToken;

use super::SqliteRepository;
use super::mapping::map_session_row;
use crate::repository::{SessionRecord, SessionRepository, StorageError};

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

#[async_trait::async_trait]
impl SessionRepository for SqliteRepository {
    async fn insert_session(&self, record: &SessionRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO sessions (token, student_id, student_name, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(record.token.as_str())
        .bind(record.student_id.as_str())
        .bind(record.student_name.as_str())
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StorageError::Conflict
            } else {
                StorageError::Connection(e.to_string())
            }
        })?;
        Ok(())
    }

    async fn get_session(
        &self,
        token: &SessionToken,
    ) -> Result<Option<SessionRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT token, student_id, student_name, created_at
            FROM sessions
            WHERE token = ?1
            ",
        )
        .bind(token.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_session_row).transpose()
    }

    async fn delete_session(&self, token: &SessionToken) -> Result<bool, StorageError> {
        let res = sqlx::query("DELETE FROM sessions WHERE token = ?1")
            .bind(token.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(res.rows_affected() > 0)
    }
}
