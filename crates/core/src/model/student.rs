use serde::Serialize;

use crate::credentials::PasswordHash;
use crate::model::ids::StudentId;

/// A student snapshot as read from the students sheet.
///
/// Every text field defaults to an empty string when its column is missing.
/// `password_hash` is `None` when the row has no usable credential, which
/// means the student cannot log in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Student {
    pub student_id: StudentId,
    pub student_name: String,
    pub current_grade: String,
    pub previous_grades: Vec<String>,
    pub comments: String,
    pub share_link: String,
    pub student_email: String,
    #[serde(skip)]
    pub password_hash: Option<PasswordHash>,
    pub next_lesson_date: String,
    pub next_lesson_time: String,
    pub next_lesson_length: String,
}

impl Student {
    /// The current grade, or `None` when the cell was blank.
    #[must_use]
    pub fn current_grade(&self) -> Option<&str> {
        let grade = self.current_grade.trim();
        (!grade.is_empty()).then_some(grade)
    }

    /// Case-insensitive email match, ignoring surrounding whitespace.
    #[must_use]
    pub fn email_matches(&self, email: &str) -> bool {
        let own = self.student_email.trim();
        !own.is_empty() && own.eq_ignore_ascii_case(email.trim())
    }
}
