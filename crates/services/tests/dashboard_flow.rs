use std::sync::Arc;

use async_trait::async_trait;
use services::{
    AppServices, Clock, DashboardConfig, LinkTitleService, LoginError, TitleLookupError,
    TitleResolver,
};
use storage::Storage;
use tuition_core::SheetTable;
use tuition_core::credentials::hash_password;
use tuition_core::model::ItemStatus;
use tuition_core::time::fixed_now;

struct DocsOnly;

#[async_trait]
impl TitleResolver for DocsOnly {
    async fn resolve(&self, url: &str) -> Result<Option<String>, TitleLookupError> {
        if url.contains("docs.google.com") {
            Ok(Some("Grade 6 Scale Sheet".into()))
        } else if url.contains("youtu") {
            Err(TitleLookupError::MissingTitle)
        } else {
            Ok(None)
        }
    }
}

fn grid(rows: &[&[&str]]) -> SheetTable {
    SheetTable::from_values(
        rows.iter()
            .map(|r| r.iter().map(|c| (*c).to_owned()).collect())
            .collect(),
    )
}

fn seeded() -> (AppServices, Storage) {
    let (storage, repo) = Storage::in_memory();
    let hash = hash_password("scales4ever", "pepper").unwrap().encode();

    repo.insert_tab(
        "students",
        grid(&[
            &[
                "Student ID",
                "Student Name",
                "Email",
                "Password Hash",
                "Current Grade",
                "Previous Grades",
            ],
            &["1", "Ada", "ada@example.com", hash.as_str(), "Grade 6", "Grade 5; Grade 4"],
        ]),
    )
    .unwrap();
    repo.insert_tab(
        "progress",
        grid(&[
            &["student_id", "grade", "category", "detail", "item_status", "resource_links"],
            &[
                "1",
                "Grade 6",
                "Scales",
                "C Major",
                "Completed",
                "https://docs.google.com/document/d/abc, https://youtu.be/xyz",
            ],
            &["1", "Grade 6", "Chords", "G Major", "In Progress", ""],
            &["1", "Grade 5", "Pieces", "Minuet in G", "Completed", ""],
            &["1", "Grade 5", "Pieces", "Gavotte", "done", ""],
            &["1", "Theory", "Intervals", "Thirds", "", "https://example.com/major-thirds"],
            &["2", "Grade 6", "Scales", "D Major", "Completed", ""],
        ]),
    )
    .unwrap();

    let titles = Arc::new(LinkTitleService::new(Arc::new(DocsOnly)));
    let app = AppServices::from_storage(
        &storage,
        &DashboardConfig::default(),
        Clock::fixed(fixed_now()),
        Some(titles),
    );
    (app, storage)
}

#[tokio::test]
async fn login_then_dashboard() {
    let (app, _storage) = seeded();

    let outcome = app
        .login()
        .login("ADA@example.com", "scales4ever")
        .await
        .unwrap();
    assert_eq!(outcome.student.previous_grades, vec!["Grade 5", "Grade 4"]);

    let student = app.login().resume(&outcome.session.token).await.unwrap();
    let dash = app.dashboard().load(&student).await.unwrap();

    let order: Vec<_> = dash.report.iter().map(|r| r.grade.as_str()).collect();
    assert_eq!(order, vec!["Grade 6", "Grade 5", "Grade 4", "Theory"]);

    let current = &dash.report[0];
    assert!(current.is_current);
    assert_eq!((current.completed, current.total, current.percentage), (1, 2, 50));

    let links = &current.tasks[0].resource_links;
    assert_eq!(links[0].title, "Grade 6 Scale Sheet");
    assert_eq!(links[1].title, "xyz");

    // only the exact label counts as completed
    assert_eq!((dash.report[1].completed, dash.report[1].total), (1, 2));
    assert_eq!(dash.report[1].percentage, 50);
    assert_eq!(dash.report[1].tasks[1].item_status, ItemStatus::NotStarted);
    assert_eq!(dash.report[2].total, 0);
    assert_eq!(dash.report[3].tasks[0].item_status, ItemStatus::NotStarted);
    assert_eq!(dash.report[3].tasks[0].resource_links[0].title, "major thirds");

    assert_eq!(dash.summary.total, 5);
    assert_eq!(dash.summary.completed, 2);
    assert_eq!(dash.summary.percentage, 40);
}

#[tokio::test]
async fn bad_password_is_invalid_credentials() {
    let (app, _storage) = seeded();
    let err = app.login().login("ada@example.com", "wrong").await.unwrap_err();
    assert!(matches!(err, LoginError::InvalidCredentials));
}
