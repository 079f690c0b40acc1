//! Google Drive v3 `files.list` / `files.get?alt=media`

use super::{extract_file_id, first_reference, ImageLookup, ImageSource};
use crate::config::Config;
use crate::error::{ReportError, Result};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

/// エラーレスポンス `{"error": {"errors": [{"reason": ...}]}}`
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: ErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    errors: Vec<ErrorReason>,
}

#[derive(Debug, Deserialize)]
struct ErrorReason {
    #[serde(default)]
    reason: String,
}

/// 403のうちファイル単位の拒否（他のファイルは取得できる）
const FILE_LEVEL_DENIALS: &[&str] = &[
    "cannotDownloadFile",
    "insufficientFilePermissions",
    "appNotAuthorizedToFile",
    "domainPolicy",
];

/// 403本文がファイル単位の拒否なら、その理由
fn file_level_denial(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .error
        .errors
        .into_iter()
        .map(|e| e.reason)
        .find(|reason| FILE_LEVEL_DENIALS.contains(&reason.as_str()))
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    #[serde(default)]
    name: String,
}

pub struct GoogleDriveSource {
    client: Client,
    base_url: String,
    folder_id: Option<String>,
    token: String,
}

impl GoogleDriveSource {
    pub fn new(client: Client, config: &Config, token: String) -> Self {
        Self {
            client,
            base_url: config.drive_api_base.clone(),
            folder_id: config.drive_folder_id.clone(),
            token,
        }
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ReportError::Config(format!("drive_api_base が不正です: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ReportError::Config(format!("drive_api_base が不正です: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// フォルダ内のファイル名検索クエリ
    pub(crate) fn name_query(&self, name: &str) -> String {
        let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
        match &self.folder_id {
            Some(folder) => format!(
                "name = '{}' and '{}' in parents and trashed = false",
                escaped, folder
            ),
            None => format!("name = '{}' and trashed = false", escaped),
        }
    }

    async fn find_file_id(&self, name: &str) -> Result<Option<String>> {
        let url = self.url(&["files"])?;
        let query = self.name_query(name);
        log::debug!("Drive検索: {}", query);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id,name)"),
                ("pageSize", "1"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable("Drive files.list", status, response).await);
        }

        let list: FileList = response.json().await?;
        Ok(list.files.into_iter().next().map(|f| {
            log::debug!("Drive検索ヒット: {} ({})", f.name, f.id);
            f.id
        }))
    }

    async fn download(&self, file_id: &str) -> Result<ImageLookup> {
        let url = self.url(&["files", file_id])?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .query(&[("alt", "media"), ("supportsAllDrives", "true")])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(ImageLookup::NotFound);
        }
        if status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            if let Some(reason) = file_level_denial(&body) {
                log::warn!("Drive: ファイル {} を取得できません ({})", file_id, reason);
                return Ok(ImageLookup::NotFound);
            }
            return Err(ReportError::SourceUnavailable(format!(
                "Drive files.get {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }
        if !status.is_success() {
            return Err(unavailable("Drive files.get", status, response).await);
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(ImageLookup::NotFound);
        }
        Ok(ImageLookup::Found(bytes.to_vec()))
    }
}

impl ImageSource for GoogleDriveSource {
    async fn fetch_image(&self, image_name: &str) -> Result<ImageLookup> {
        let reference = first_reference(image_name);
        if reference.is_empty() {
            return Ok(ImageLookup::NotFound);
        }

        if let Some(file_id) = extract_file_id(reference) {
            return self.download(&file_id).await;
        }

        match self.find_file_id(reference).await? {
            Some(file_id) => self.download(&file_id).await,
            None => Ok(ImageLookup::NotFound),
        }
    }
}

async fn unavailable(api: &str, status: StatusCode, response: reqwest::Response) -> ReportError {
    let body = response.text().await.unwrap_or_default();
    ReportError::SourceUnavailable(format!(
        "{} {}: {}",
        api,
        status,
        body.chars().take(200).collect::<String>()
    ))
}
