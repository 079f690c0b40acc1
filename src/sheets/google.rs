//! Google Sheets v4 `spreadsheets.values.get`

use super::{MetadataSource, SheetTable};
use crate::config::Config;
use crate::error::{ReportError, Result};
use reqwest::{Client, Url};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

pub struct GoogleSheetsSource {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    range: String,
    token: String,
}

impl GoogleSheetsSource {
    pub fn new(client: Client, config: &Config, token: String) -> Self {
        Self {
            client,
            base_url: config.sheets_api_base.clone(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            range: config.range(),
            token,
        }
    }

    pub(crate) fn values_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ReportError::Config(format!("sheets_api_base が不正です: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ReportError::Config(format!("sheets_api_base が不正です: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["spreadsheets", self.spreadsheet_id.as_str(), "values", self.range.as_str()]);
        Ok(url)
    }
}

impl MetadataSource for GoogleSheetsSource {
    async fn fetch_table(&self) -> Result<SheetTable> {
        let url = self.values_url()?;
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .query(&[("majorDimension", "ROWS")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReportError::SourceUnavailable(format!(
                "Sheets API {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let payload: ValueRange = response.json().await?;
        let values = payload
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect();
        Ok(SheetTable::from_values(values))
    }
}

/// FORMATTED_VALUE なら文字列だが、数値・真偽値も受け付ける
fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
