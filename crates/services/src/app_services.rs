use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use storage::repository::{SheetSource, Storage};
use storage::sheets::GoogleSheetsSource;

use crate::Clock;
use crate::config::DashboardConfig;
use crate::dashboard_service::DashboardService;
use crate::error::AppServicesError;
use crate::link_titles::{HttpTitleResolver, LinkTitleService};
use crate::login_service::LoginService;

const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Assembles the login and dashboard services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    login: Arc<LoginService>,
    dashboard: Arc<DashboardService>,
}

impl AppServices {
    /// Build services backed by Google Sheets and a `SQLite` session store.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if no spreadsheet is configured, the HTTP
    /// client cannot be built, or storage initialization fails.
    pub async fn new(config: &DashboardConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let sheets_config = config
            .sheets
            .clone()
            .ok_or(AppServicesError::MissingConfig("TUITION_SHEET_ID"))?;
        let client = Client::builder().timeout(HTTP_TIMEOUT).build()?;

        let sheets: Arc<dyn SheetSource> =
            Arc::new(GoogleSheetsSource::new(client.clone(), sheets_config));
        let storage = Storage::sqlite(&config.db_url, sheets).await?;

        let titles = config
            .enrich_titles
            .then(|| Arc::new(LinkTitleService::new(Arc::new(HttpTitleResolver::new(client)))));

        Ok(Self::from_storage(&storage, config, clock, titles))
    }

    /// Build services over an existing storage, e.g. `Storage::in_memory()`.
    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        config: &DashboardConfig,
        clock: Clock,
        titles: Option<Arc<LinkTitleService>>,
    ) -> Self {
        let login = Arc::new(LoginService::new(
            clock,
            Arc::clone(&storage.sheets),
            Arc::clone(&storage.sessions),
            config.students_tab.clone(),
        ));
        let mut dashboard =
            DashboardService::new(clock, Arc::clone(&storage.sheets), config.progress_tab.clone());
        if let Some(titles) = titles {
            dashboard = dashboard.with_titles(titles);
        }

        Self {
            login,
            dashboard: Arc::new(dashboard),
        }
    }

    #[must_use]
    pub fn login(&self) -> Arc<LoginService> {
        Arc::clone(&self.login)
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn new_requires_a_spreadsheet() {
        let config = DashboardConfig::default();
        let result = AppServices::new(&config, Clock::default_clock()).await;
        assert!(matches!(
            result,
            Err(AppServicesError::MissingConfig("TUITION_SHEET_ID"))
        ));
    }
}
