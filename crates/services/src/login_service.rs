use std::sync::Arc;

use storage::repository::{SessionRecord, SessionRepository, SheetSource};
use tuition_core::SheetTable;
use tuition_core::model::{SessionToken, Student, StudentId};

use crate::Clock;
use crate::error::{LoginError, SessionError};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub session: SessionRecord,
    pub student: Student,
}

/// Verifies credentials against the students tab and manages sessions.
#[derive(Clone)]
pub struct LoginService {
    clock: Clock,
    sheets: Arc<dyn SheetSource>,
    sessions: Arc<dyn SessionRepository>,
    students_tab: String,
}

impl LoginService {
    #[must_use]
    pub fn new(
        clock: Clock,
        sheets: Arc<dyn SheetSource>,
        sessions: Arc<dyn SessionRepository>,
        students_tab: impl Into<String>,
    ) -> Self {
        Self {
            clock,
            sheets,
            sessions,
            students_tab: students_tab.into(),
        }
    }

    /// Check an email/password pair and open a session.
    ///
    /// The email is compared case-insensitively; the password is checked
    /// against the row's stored hash. Rows without a usable hash never match.
    ///
    /// # Errors
    ///
    /// Returns `LoginError::MissingCredentials` for a blank email or password,
    /// `LoginError::InvalidCredentials` when no row matches, and
    /// `LoginError::DataUnavailable` if the sheet or session store fails.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, LoginError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(LoginError::MissingCredentials);
        }

        let table = self.students().await?;
        let student = table
            .students()
            .into_iter()
            .find(|s| {
                s.email_matches(email)
                    && s.password_hash.as_ref().is_some_and(|h| h.verify(password))
            })
            .ok_or_else(|| {
                tracing::info!("login rejected");
                LoginError::InvalidCredentials
            })?;

        let session = SessionRecord::for_student(&student, self.clock.now());
        self.sessions.insert_session(&session).await?;
        tracing::info!(student_id = %student.student_id, "session opened");

        Ok(LoginOutcome { session, student })
    }

    /// Look up a session and return a fresh snapshot of its student.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFound` if the token is unknown or the student
    /// row has since disappeared, and `SessionError::DataUnavailable` on
    /// storage failures.
    pub async fn resume(&self, token: &SessionToken) -> Result<Student, SessionError> {
        let session = self
            .sessions
            .get_session(token)
            .await?
            .ok_or(SessionError::NotFound)?;
        self.find_student(&session.student_id)
            .await?
            .ok_or(SessionError::NotFound)
    }

    /// End a session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFound` if the token is unknown.
    pub async fn logout(&self, token: &SessionToken) -> Result<(), SessionError> {
        if self.sessions.delete_session(token).await? {
            tracing::info!("session closed");
            Ok(())
        } else {
            Err(SessionError::NotFound)
        }
    }

    /// Fetch one student by id from the students tab.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the sheet cannot be read.
    pub async fn find_student(
        &self,
        id: &StudentId,
    ) -> Result<Option<Student>, storage::repository::StorageError> {
        let table = self.students().await?;
        Ok(table.students().into_iter().find(|s| &s.student_id == id))
    }

    async fn students(&self) -> Result<SheetTable, storage::repository::StorageError> {
        self.sheets.fetch_tab(&self.students_tab).await
    }
}
