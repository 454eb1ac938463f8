//! Turns raw spreadsheet grids into typed records.
//!
//! The mapper never fails: a missing column, a short row, or an unreadable
//! cell degrades to an empty string, an empty list, or `Not Started`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::credentials::PasswordHash;
use crate::model::{GradeInput, ItemStatus, ProgressItem, Student, StudentId};

pub use crate::model::link::normalize_resource_links;

//
// ─── SHEET TABLE ───────────────────────────────────────────────────────────────
//

/// A header row plus data rows, as returned by the sheet source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    /// Splits a raw value grid into header and data rows.
    #[must_use]
    pub fn from_values(mut values: Vec<Vec<String>>) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let headers = values.remove(0);
        Self {
            headers,
            rows: values,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Maps every data row to a `Student`.
    #[must_use]
    pub fn students(&self) -> Vec<Student> {
        let index = HeaderIndex::new(&self.headers);
        self.rows.iter().map(|row| index.student(row)).collect()
    }

    /// Maps data rows to progress items, optionally keeping one student's rows.
    #[must_use]
    pub fn progress(&self, student_id: Option<&StudentId>) -> Vec<ProgressItem> {
        map_progress_rows(&self.headers, &self.rows, student_id)
    }
}

//
// ─── HEADER INDEX ──────────────────────────────────────────────────────────────
//

/// Column lookup keyed by normalized header name.
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    columns: HashMap<String, usize>,
}

impl HeaderIndex {
    #[must_use]
    pub fn new<S: AsRef<str>>(headers: &[S]) -> Self {
        let mut columns = HashMap::with_capacity(headers.len());
        for (position, header) in headers.iter().enumerate() {
            let key = canonical_header(header.as_ref());
            if key.is_empty() {
                continue;
            }
            // Leftmost column wins when a header repeats.
            columns.entry(key).or_insert(position);
        }
        Self { columns }
    }

    #[must_use]
    pub fn position(&self, field: &str) -> Option<usize> {
        self.columns.get(&canonical_header(field)).copied()
    }

    /// Trimmed cell for `field`, or `""` when the column or cell is missing.
    #[must_use]
    pub fn cell<'r, S: AsRef<str>>(&self, row: &'r [S], field: &str) -> &'r str {
        self.position(field)
            .and_then(|i| row.get(i))
            .map_or("", |cell| cell.as_ref().trim())
    }

    /// Untrimmed cell. Used for task text, which is kept verbatim, and for
    /// list-valued cells, which are split before trimming.
    fn raw_cell<'r, S: AsRef<str>>(&self, row: &'r [S], field: &str) -> &'r str {
        self.position(field)
            .and_then(|i| row.get(i))
            .map_or("", |cell| cell.as_ref())
    }

    #[must_use]
    pub fn student<S: AsRef<str>>(&self, row: &[S]) -> Student {
        let password_hash = match self.cell(row, "student_password_hash") {
            "" => None,
            encoded => PasswordHash::parse(encoded).ok(),
        };

        Student {
            student_id: StudentId::new(self.cell(row, "student_id")),
            student_name: self.cell(row, "student_name").to_owned(),
            current_grade: self.cell(row, "current_grade").to_owned(),
            previous_grades: GradeInput::from(self.raw_cell(row, "previous_grades")).normalize(),
            comments: self.cell(row, "comments").to_owned(),
            share_link: self.cell(row, "share_link").to_owned(),
            student_email: self.cell(row, "student_email").to_owned(),
            password_hash,
            next_lesson_date: self.cell(row, "next_lesson_date").to_owned(),
            next_lesson_time: self.cell(row, "next_lesson_time").to_owned(),
            next_lesson_length: self.cell(row, "next_lesson_length").to_owned(),
        }
    }

    #[must_use]
    pub fn progress_item<S: AsRef<str>>(&self, row: &[S]) -> ProgressItem {
        ProgressItem {
            student_id: StudentId::new(self.cell(row, "student_id")),
            grade: self.raw_cell(row, "grade").to_owned(),
            category: self.raw_cell(row, "category").to_owned(),
            detail: self.raw_cell(row, "detail").to_owned(),
            item_status: ItemStatus::parse_lenient(self.cell(row, "item_status")),
            resource_links: normalize_resource_links(self.raw_cell(row, "resource_links")),
        }
    }
}

/// Lower-cases, trims, folds spaces/hyphens to `_`, then resolves aliases.
fn canonical_header(raw: &str) -> String {
    let folded: String = raw
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect();

    let canonical = match folded.as_str() {
        "id" => "student_id",
        "name" => "student_name",
        "email" | "email_address" => "student_email",
        "password_hash" | "credential" => "student_password_hash",
        "previous_grade" => "previous_grades",
        "status" => "item_status",
        "links" | "resources" | "resource_link" => "resource_links",
        other => other,
    };
    canonical.to_owned()
}

//
// ─── MAPPING OPERATIONS ───────────────────────────────────────────────────────
//

/// Maps one students-sheet row. Never fails.
#[must_use]
pub fn map_student_row<H: AsRef<str>, C: AsRef<str>>(headers: &[H], row: &[C]) -> Student {
    HeaderIndex::new(headers).student(row)
}

/// Maps progress rows, dropping incomplete rows and, when `filter` is given,
/// rows that belong to another student.
#[must_use]
pub fn map_progress_rows<H, R, C>(
    headers: &[H],
    rows: &[R],
    filter: Option<&StudentId>,
) -> Vec<ProgressItem>
where
    H: AsRef<str>,
    R: AsRef<[C]>,
    C: AsRef<str>,
{
    let index = HeaderIndex::new(headers);
    rows.iter()
        .map(|row| index.progress_item(row.as_ref()))
        .filter(|item| filter.is_none_or(|id| &item.student_id == id))
        .filter(|item| !item.is_incomplete())
        .collect()
}
