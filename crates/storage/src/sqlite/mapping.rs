use sqlx::Row;
use tuition_core::model::{SessionToken, StudentId};

use crate::repository::{SessionRecord, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn map_session_row(row: &sqlx::sqlite::SqliteRow) -> Result<SessionRecord, StorageError> {
    Ok(SessionRecord {
        token: SessionToken::new(row.try_get::<String, _>("token").map_err(ser)?),
        student_id: StudentId::new(row.try_get::<String, _>("student_id").map_err(ser)?),
        student_name: row.try_get("student_name").map_err(ser)?,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}
