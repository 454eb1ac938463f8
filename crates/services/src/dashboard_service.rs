use std::sync::Arc;

use serde::Serialize;
use storage::repository::SheetSource;
use tuition_core::lesson::NextLesson;
use tuition_core::model::{ProgressItem, Student};
use tuition_core::{DashboardSummary, GradeReport, build_report};

use crate::Clock;
use crate::error::DashboardError;
use crate::link_titles::LinkTitleService;

/// Everything the dashboard view renders for one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub student: Student,
    pub report: Vec<GradeReport>,
    pub summary: DashboardSummary,
    /// Set whenever the student row carries a parseable date, time and length.
    pub next_lesson: Option<NextLesson>,
    /// False when `next_lesson` has already started, so a view can mark it stale.
    pub next_lesson_upcoming: bool,
}

impl Dashboard {
    #[must_use]
    pub fn has_progress(&self) -> bool {
        !self.report.is_empty()
    }
}

/// Loads a student's progress rows and groups them into grade sections.
#[derive(Clone)]
pub struct DashboardService {
    clock: Clock,
    sheets: Arc<dyn SheetSource>,
    progress_tab: String,
    titles: Option<Arc<LinkTitleService>>,
}

impl DashboardService {
    #[must_use]
    pub fn new(clock: Clock, sheets: Arc<dyn SheetSource>, progress_tab: impl Into<String>) -> Self {
        Self {
            clock,
            sheets,
            progress_tab: progress_tab.into(),
            titles: None,
        }
    }

    /// Enable link-title lookups before grouping.
    #[must_use]
    pub fn with_titles(mut self, titles: Arc<LinkTitleService>) -> Self {
        self.titles = Some(titles);
        self
    }

    /// Progress rows belonging to `student`, incomplete rows dropped.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::DataUnavailable` if the progress tab cannot be read.
    pub async fn progress_items(&self, student: &Student) -> Result<Vec<ProgressItem>, DashboardError> {
        let table = self.sheets.fetch_tab(&self.progress_tab).await?;
        let mut items = table.progress(Some(&student.student_id));
        if let Some(titles) = &self.titles {
            titles.enrich(&mut items).await;
        }
        Ok(items)
    }

    /// Build the dashboard for a logged-in student.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::DataUnavailable` if the progress tab cannot be read.
    pub async fn load(&self, student: &Student) -> Result<Dashboard, DashboardError> {
        let items = self.progress_items(student).await?;
        let report = build_report(student, &items);
        let summary = DashboardSummary::from_report(&report);
        let next_lesson = NextLesson::for_student(student);
        let next_lesson_upcoming = next_lesson
            .as_ref()
            .is_some_and(|lesson| lesson.is_upcoming(&self.clock));

        tracing::debug!(
            student_id = %student.student_id,
            sections = report.len(),
            tasks = items.len(),
            "dashboard loaded"
        );

        Ok(Dashboard {
            student: student.clone(),
            report,
            summary,
            next_lesson,
            next_lesson_upcoming,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use storage::repository::{InMemoryRepository, StorageError};
    use tuition_core::SheetTable;
    use tuition_core::model::StudentId;
    use tuition_core::time::fixed_clock;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| (*c).to_owned()).collect()
    }

    fn progress_repo() -> InMemoryRepository {
        let repo = InMemoryRepository::new();
        repo.insert_tab(
            "progress",
            SheetTable::from_values(vec![
                row(&["student_id", "grade", "category", "detail", "item_status", "resource_links"]),
                row(&["123", "Grade 2", "Scales", "D Major", "Completed", ""]),
                row(&["123", "Grade 2", "Pieces", "Minuet", "In Progress", "https://a.com/minuet"]),
                row(&["123", "Grade 1", "Scales", "C Major", "Completed", ""]),
                row(&["456", "Grade 2", "Scales", "E Major", "Completed", ""]),
                row(&["123", "Grade 2", "", "", "Completed", ""]),
            ]),
        )
        .unwrap();
        repo
    }

    fn student(current: &str, previous: &[&str]) -> Student {
        Student {
            student_id: StudentId::new("123"),
            student_name: "Alice".into(),
            current_grade: current.into(),
            previous_grades: previous.iter().map(|g| (*g).to_owned()).collect(),
            ..Student::default()
        }
    }

    #[tokio::test]
    async fn groups_only_the_students_rows() {
        let svc = DashboardService::new(fixed_clock(), Arc::new(progress_repo()), "progress");
        let dash = svc.load(&student("Grade 2", &["Grade 1"])).await.unwrap();

        let grades: Vec<_> = dash.report.iter().map(|r| r.grade.as_str()).collect();
        assert_eq!(grades, vec!["Grade 2", "Grade 1"]);
        assert!(dash.report[0].is_current);
        assert_eq!((dash.report[0].completed, dash.report[0].total), (1, 2));
        assert_eq!(dash.report[0].percentage, 50);
        assert_eq!(dash.summary.total, 3);
        assert_eq!(dash.summary.completed, 2);
        assert!(dash.next_lesson.is_none());
        assert!(!dash.next_lesson_upcoming);
    }

    #[tokio::test]
    async fn student_without_rows_gets_empty_dashboard() {
        let svc = DashboardService::new(fixed_clock(), Arc::new(progress_repo()), "progress");
        let mut other = student("Grade 5", &[]);
        other.student_id = StudentId::new("999");
        let dash = svc.load(&other).await.unwrap();
        assert!(!dash.has_progress());
        assert_eq!(dash.summary.total, 0);
    }

    #[tokio::test]
    async fn missing_tab_is_data_unavailable() {
        let svc = DashboardService::new(fixed_clock(), Arc::new(InMemoryRepository::new()), "progress");
        let err = svc.load(&student("Grade 1", &[])).await.unwrap_err();
        assert!(matches!(err, DashboardError::DataUnavailable(StorageError::NotFound)));
    }

    #[tokio::test]
    async fn next_lesson_shown_even_when_past() {
        let svc = DashboardService::new(fixed_clock(), Arc::new(progress_repo()), "progress");

        let mut future = student("Grade 2", &[]);
        future.next_lesson_date = "2099-01-05".into();
        future.next_lesson_time = "16:00".into();
        future.next_lesson_length = "30 mins".into();
        let dash = svc.load(&future).await.unwrap();
        assert_eq!(
            dash.next_lesson.map(|l| l.length),
            Some("30 mins".to_owned())
        );
        assert!(dash.next_lesson_upcoming);

        let mut past = future.clone();
        past.next_lesson_date = "2000-01-05".into();
        let dash = svc.load(&past).await.unwrap();
        assert_eq!(dash.next_lesson.map(|l| l.length), Some("30 mins".to_owned()));
        assert!(!dash.next_lesson_upcoming);

        let mut unparsable = future;
        unparsable.next_lesson_time = "after school".into();
        let dash = svc.load(&unparsable).await.unwrap();
        assert!(dash.next_lesson.is_none());
        assert!(!dash.next_lesson_upcoming);
    }
}
