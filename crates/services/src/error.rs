//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `LoginService::login`.
///
/// A wrong password and an unknown email both surface as
/// `InvalidCredentials`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoginError {
    #[error("email and password are required")]
    MissingCredentials,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("student data unavailable: {0}")]
    DataUnavailable(#[from] StorageError),
}

/// Errors emitted while resuming or ending a session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session not found")]
    NotFound,
    #[error("student data unavailable: {0}")]
    DataUnavailable(#[from] StorageError),
}

/// Errors emitted by `DashboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DashboardError {
    #[error("progress data unavailable: {0}")]
    DataUnavailable(#[from] StorageError),
}

/// Errors from a single link-title lookup. Never leaves the enrichment step.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TitleLookupError {
    #[error("title request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("response had no usable title")]
    MissingTitle,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
