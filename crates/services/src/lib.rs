#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod dashboard_service;
pub mod error;
pub mod link_titles;
pub mod login_service;

pub use tuition_core::Clock;

pub use app_services::AppServices;
pub use config::DashboardConfig;
pub use dashboard_service::{Dashboard, DashboardService};
pub use error::{AppServicesError, DashboardError, LoginError, SessionError, TitleLookupError};
pub use link_titles::{HttpTitleResolver, LinkTitleService, TitleResolver};
pub use login_service::{LoginOutcome, LoginService};
