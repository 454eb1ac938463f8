//! Google Sheets `values.get` adapter.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tuition_core::SheetTable;
use url::Url;

use crate::repository::{SheetSource, StorageError};

pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4";

/// Connection settings for one spreadsheet.
///
/// Requests authenticate with `api_key` (sheet shared read-only) or with a
/// `bearer_token` minted elsewhere; both may be set.
#[derive(Clone)]
pub struct SheetsConfig {
    pub base_url: String,
    pub spreadsheet_id: String,
    pub api_key: Option<String>,
    pub bearer_token: Option<String>,
}

impl std::fmt::Debug for SheetsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsConfig")
            .field("base_url", &self.base_url)
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("api_key", &self.api_key.as_ref().map(|_| ".."))
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| ".."))
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct GoogleSheetsSource {
    client: Client,
    config: SheetsConfig,
}

impl GoogleSheetsSource {
    #[must_use]
    pub fn new(client: Client, config: SheetsConfig) -> Self {
        Self { client, config }
    }

    /// Builds `{base}/spreadsheets/{id}/values/{tab}` with the tab percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the base URL is unusable.
    pub fn values_url(&self, tab: &str) -> Result<Url, StorageError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| StorageError::Connection(format!("invalid base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| StorageError::Connection("base url cannot be a base".into()))?
            .pop_if_empty()
            .extend(["spreadsheets", self.config.spreadsheet_id.as_str(), "values", tab]);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("majorDimension", "ROWS");
            if let Some(key) = &self.config.api_key {
                query.append_pair("key", key);
            }
        }
        Ok(url)
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Cells come back as strings unless the caller asked for unformatted values.
fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetSource for GoogleSheetsSource {
    async fn fetch_tab(&self, tab: &str) -> Result<SheetTable, StorageError> {
        let url = self.values_url(tab)?;
        tracing::debug!(tab, "fetching sheet tab");

        let mut request = self.client.get(url);
        if let Some(token) = &self.config.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(tab, error = %e, "sheet request failed");
            StorageError::Connection(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(tab, status = status.as_u16(), "sheet request rejected");
            return Err(StorageError::Status(status.as_u16()));
        }

        let body: ValueRange = response
            .json()
            .await
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let values = body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();
        Ok(SheetTable::from_values(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(base_url: &str, api_key: Option<&str>) -> GoogleSheetsSource {
        GoogleSheetsSource::new(
            Client::new(),
            SheetsConfig {
                base_url: base_url.into(),
                spreadsheet_id: "sheet-123".into(),
                api_key: api_key.map(str::to_owned),
                bearer_token: None,
            },
        )
    }

    #[test]
    fn builds_values_url_with_encoded_tab() {
        let url = source(DEFAULT_BASE_URL, Some("k3y"))
            .values_url("Progress 2024")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-123/values/Progress%202024?majorDimension=ROWS&key=k3y"
        );
    }

    #[test]
    fn trailing_slash_base_is_tolerated() {
        let url = source("http://localhost:8080/v4/", None)
            .values_url("students")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/v4/spreadsheets/sheet-123/values/students?majorDimension=ROWS"
        );
    }

    #[test]
    fn rejects_unusable_base_url() {
        assert!(matches!(
            source("not a url", None).values_url("students"),
            Err(StorageError::Connection(_))
        ));
    }

    #[test]
    fn decodes_value_range_cells() {
        let body: ValueRange = serde_json::from_str(
            r#"{"range": "students!A1:C3", "values": [["id", "name"], [7, null, true]]}"#,
        )
        .unwrap();
        let values: Vec<Vec<String>> = body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();
        let table = SheetTable::from_values(values);
        assert_eq!(table.headers, vec!["id", "name"]);
        assert_eq!(table.rows, vec![vec!["7", "", "true"]]);

        let empty: ValueRange = serde_json::from_str(r#"{"range": "progress"}"#).unwrap();
        assert!(empty.values.is_empty());
    }

    #[test]
    fn debug_hides_secrets() {
        let rendered = format!("{:?}", source(DEFAULT_BASE_URL, Some("k3y")));
        assert!(!rendered.contains("k3y"));
    }
}
