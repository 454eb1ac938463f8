//! Grade-sectioned progress report.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::grades::dedup_labels;
use crate::model::{ProgressItem, Student};

/// One grade section of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradeReport {
    pub grade: String,
    pub tasks: Vec<ProgressItem>,
    pub is_current: bool,
    pub completed: u32,
    pub total: u32,
    pub percentage: u32,
}

impl GradeReport {
    fn new(grade: String, tasks: Vec<ProgressItem>, is_current: bool) -> Self {
        let total = count(tasks.len());
        let completed = count(tasks.iter().filter(|t| t.item_status.is_completed()).count());
        Self {
            percentage: percentage(completed, total),
            grade,
            tasks,
            is_current,
            completed,
            total,
        }
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.total - self.completed
    }
}

/// Totals across every section of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub grades: u32,
    pub completed: u32,
    pub total: u32,
    pub percentage: u32,
}

impl DashboardSummary {
    #[must_use]
    pub fn from_report(report: &[GradeReport]) -> Self {
        let completed = report.iter().map(|g| g.completed).sum();
        let total = report.iter().map(|g| g.total).sum();
        Self {
            grades: count(report.len()),
            completed,
            total,
            percentage: percentage(completed, total),
        }
    }
}

/// Builds the per-grade report for a student.
///
/// Section order is the current grade, then previous grades as listed, then
/// any other grade found in `items` in first-seen order. Listed grades with
/// no tasks still get an (empty) section; an empty `items` yields no sections.
#[must_use]
pub fn build_report(student: &Student, items: &[ProgressItem]) -> Vec<GradeReport> {
    if items.is_empty() {
        return Vec::new();
    }

    let mut by_grade: HashMap<&str, Vec<ProgressItem>> = HashMap::new();
    let mut encountered: Vec<&str> = Vec::new();
    for item in items {
        let grade = item.grade.as_str();
        by_grade
            .entry(grade)
            .or_insert_with(|| {
                encountered.push(grade);
                Vec::new()
            })
            .push(item.clone());
    }

    let current = student.current_grade();
    let listed = current
        .into_iter()
        .chain(student.previous_grades.iter().map(String::as_str));
    let mut order = dedup_labels(listed);
    for grade in encountered {
        if !order.iter().any(|g| g == grade) {
            order.push(grade.to_owned());
        }
    }

    order
        .into_iter()
        .map(|grade| {
            let tasks = by_grade.remove(grade.as_str()).unwrap_or_default();
            let is_current = current == Some(grade.as_str());
            GradeReport::new(grade, tasks, is_current)
        })
        .collect()
}

/// `round(100 * completed / total)` with halves rounded up; `0` when empty.
fn percentage(completed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let scaled = u64::from(completed) * 100;
    let total = u64::from(total);
    u32::try_from((scaled * 2 + total) / (total * 2)).unwrap_or(100)
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
