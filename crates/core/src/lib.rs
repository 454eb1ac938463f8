#![forbid(unsafe_code)]

pub mod chords;
pub mod credentials;
pub mod error;
pub mod lesson;
pub mod mapper;
pub mod model;
pub mod pitch;
pub mod report;
pub mod time;

pub use error::Error;
pub use mapper::{SheetTable, map_progress_rows, map_student_row, normalize_resource_links};
pub use report::{DashboardSummary, GradeReport, build_report};
pub use time::Clock;
