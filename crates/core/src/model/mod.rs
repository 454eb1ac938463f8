pub mod grades;
mod ids;
pub mod link;
mod progress;
mod student;

pub use grades::{GradeInput, normalize_grades};
pub use ids::{SessionToken, StudentId};
pub use link::{RawLink, RawLinks, ResourceLink};
pub use progress::{ItemStatus, ProgressItem};
pub use student::Student;
