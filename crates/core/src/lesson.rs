use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::model::Student;
use crate::time::Clock;

/// The student's next booked lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextLesson {
    pub starts_at: NaiveDateTime,
    pub length: String,
}

impl NextLesson {
    /// Parses the sheet's `YYYY-MM-DD` date, `HH:MM` time, and free-text length.
    ///
    /// Returns `None` unless all three are present and the date/time parse.
    #[must_use]
    pub fn from_parts(date: &str, time: &str, length: &str) -> Option<Self> {
        let (date, time, length) = (date.trim(), time.trim(), length.trim());
        if date.is_empty() || time.is_empty() || length.is_empty() {
            return None;
        }
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
        let time = NaiveTime::parse_from_str(time, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
            .ok()?;
        Some(Self {
            starts_at: date.and_time(time),
            length: length.to_owned(),
        })
    }

    #[must_use]
    pub fn for_student(student: &Student) -> Option<Self> {
        Self::from_parts(
            &student.next_lesson_date,
            &student.next_lesson_time,
            &student.next_lesson_length,
        )
    }

    /// e.g. `Monday, Mar 4 at 14:30 (45 mins)`.
    #[must_use]
    pub fn describe(&self) -> String {
        format!(
            "{} at {} ({})",
            self.starts_at.format("%A, %b %-d"),
            self.starts_at.format("%H:%M"),
            self.length
        )
    }

    #[must_use]
    pub fn is_upcoming(&self, clock: &Clock) -> bool {
        self.starts_at >= clock.now_local()
    }
}
