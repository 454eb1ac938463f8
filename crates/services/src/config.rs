use std::env;

use storage::sheets::{DEFAULT_BASE_URL, SheetsConfig};

pub const DEFAULT_STUDENTS_TAB: &str = "students";
pub const DEFAULT_PROGRESS_TAB: &str = "progress";
pub const DEFAULT_DB_URL: &str = "sqlite://tuition.sqlite3";

/// Where the dashboard reads its data from and how it behaves.
#[derive(Clone, Debug)]
pub struct DashboardConfig {
    /// `None` when `TUITION_SHEET_ID` is unset.
    pub sheets: Option<SheetsConfig>,
    pub students_tab: String,
    pub progress_tab: String,
    pub db_url: String,
    pub enrich_titles: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            sheets: None,
            students_tab: DEFAULT_STUDENTS_TAB.into(),
            progress_tab: DEFAULT_PROGRESS_TAB.into(),
            db_url: DEFAULT_DB_URL.into(),
            enrich_titles: true,
        }
    }
}

impl DashboardConfig {
    /// Reads `TUITION_*` environment variables, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let sheets = non_empty("TUITION_SHEET_ID").map(|spreadsheet_id| SheetsConfig {
            base_url: non_empty("TUITION_SHEETS_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            spreadsheet_id,
            api_key: non_empty("TUITION_SHEETS_API_KEY"),
            bearer_token: non_empty("TUITION_SHEETS_TOKEN"),
        });

        let enrich_titles = non_empty("TUITION_ENRICH_TITLES").is_none_or(|raw| {
            !matches!(raw.trim().to_ascii_lowercase().as_str(), "0" | "false" | "off" | "no")
        });

        Self {
            sheets,
            students_tab: non_empty("TUITION_STUDENTS_TAB")
                .unwrap_or_else(|| DEFAULT_STUDENTS_TAB.into()),
            progress_tab: non_empty("TUITION_PROGRESS_TAB")
                .unwrap_or_else(|| DEFAULT_PROGRESS_TAB.into()),
            db_url: non_empty("TUITION_DB_URL").unwrap_or_else(|| DEFAULT_DB_URL.into()),
            enrich_titles,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> DashboardConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        DashboardConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_env() {
        let cfg = config(&[]);
        assert!(cfg.sheets.is_none());
        assert_eq!(cfg.students_tab, "students");
        assert_eq!(cfg.progress_tab, "progress");
        assert_eq!(cfg.db_url, DEFAULT_DB_URL);
        assert!(cfg.enrich_titles);
    }

    #[test]
    fn reads_sheet_settings() {
        let cfg = config(&[
            ("TUITION_SHEET_ID", "abc"),
            ("TUITION_SHEETS_API_KEY", "key"),
            ("TUITION_STUDENTS_TAB", "Students"),
            ("TUITION_PROGRESS_TAB", " "),
            ("TUITION_ENRICH_TITLES", "off"),
        ]);
        let sheets = cfg.sheets.expect("sheets configured");
        assert_eq!(sheets.spreadsheet_id, "abc");
        assert_eq!(sheets.api_key.as_deref(), Some("key"));
        assert_eq!(sheets.base_url, DEFAULT_BASE_URL);
        assert!(sheets.bearer_token.is_none());
        assert_eq!(cfg.students_tab, "Students");
        assert_eq!(cfg.progress_tab, "progress");
        assert!(!cfg.enrich_titles);
    }
}
