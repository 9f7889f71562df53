//! Drive-style document store — a REST client over the hosted files API.
//!
//! Folder listings go through the v3 `files` endpoint with a parent-folder
//! query. Content fetch exports Google-native documents as plain text and
//! downloads everything else via `alt=media`, keeping the bytes only when
//! they decode as UTF-8. A document whose text cannot be extracted yields
//! an empty string, never an error: the pipeline tolerates empties, and a
//! single bad file must not take down the whole request.

use std::time::Duration;

use async_trait::async_trait;
use caretutor_core::error::StoreError;
use caretutor_core::{DocumentRef, DocumentSource, DocumentStore};
use serde::Deserialize;
use tracing::{debug, warn};

/// Default base URL for the hosted files API.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// MIME prefix shared by Google-native documents (docs, sheets, slides).
/// These have no direct binary payload and must be exported instead.
const GOOGLE_APPS_PREFIX: &str = "application/vnd.google-apps";

const LIST_FIELDS: &str = "files(id,name,mimeType)";
const LIST_PAGE_SIZE: &str = "100";

/// Identifiers of the three well-known folders. Fixed by configuration,
/// never discovered at runtime.
#[derive(Debug, Clone)]
pub struct DriveFolders {
    pub patient_data: String,
    pub guidelines: String,
    pub prompt_framework: String,
}

impl DriveFolders {
    pub fn new(
        patient_data: impl Into<String>,
        guidelines: impl Into<String>,
        prompt_framework: impl Into<String>,
    ) -> Self {
        Self {
            patient_data: patient_data.into(),
            guidelines: guidelines.into(),
            prompt_framework: prompt_framework.into(),
        }
    }
}

/// Document store backed by the Drive v3 REST API.
pub struct DriveStore {
    base_url: String,
    api_key: Option<String>,
    access_token: Option<String>,
    folders: DriveFolders,
    client: reqwest::Client,
}

impl DriveStore {
    pub fn new(folders: DriveFolders) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_default();

        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            access_token: None,
            folders,
            client,
        }
    }

    /// Override the base URL (for tests or a proxy).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Authenticate listing and fetch calls with an API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Authenticate with an OAuth bearer token. Takes precedence over the
    /// API key when both are set; either alone is enough.
    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    fn source_for_folder(&self, folder_id: &str) -> DocumentSource {
        if folder_id == self.folders.patient_data {
            DocumentSource::PatientData
        } else if folder_id == self.folders.guidelines {
            DocumentSource::Guidelines
        } else if folder_id == self.folders.prompt_framework {
            DocumentSource::PromptFramework
        } else {
            DocumentSource::Unclassified
        }
    }

    fn folder_query(folder_id: &str) -> String {
        format!("'{folder_id}' in parents and trashed = false")
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        match &self.api_key {
            Some(key) => request.query(&[("key", key.as_str())]),
            None => request,
        }
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> std::result::Result<reqwest::Response, StoreError> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(match status.as_u16() {
            401 | 403 => StoreError::AuthenticationFailed(message),
            404 => StoreError::NotFound(message),
            429 => StoreError::RateLimited,
            code => {
                warn!(status = code, "file store API error");
                StoreError::ApiError {
                    status_code: code,
                    message,
                }
            }
        })
    }

    async fn list_folder(
        &self,
        folder_id: &str,
    ) -> std::result::Result<Vec<DriveFile>, StoreError> {
        let url = format!("{}/files", self.base_url);
        let query = Self::folder_query(folder_id);
        let request = self.client.get(&url).query(&[
            ("q", query.as_str()),
            ("fields", LIST_FIELDS),
            ("pageSize", LIST_PAGE_SIZE),
        ]);

        debug!(folder_id, "listing folder");
        let response = self.send(self.authorize(request)).await?;
        let listing: FileListResponse = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;

        Ok(listing.files)
    }

    fn is_google_native(mime_type: &str) -> bool {
        mime_type.starts_with(GOOGLE_APPS_PREFIX)
    }
}

#[async_trait]
impl DocumentStore for DriveStore {
    fn name(&self) -> &str {
        "drive"
    }

    async fn list_data_files(&self) -> std::result::Result<Vec<DocumentRef>, StoreError> {
        let patient_folder = self.folders.patient_data.clone();
        let guideline_folder = self.folders.guidelines.clone();

        let mut documents = self.list_files_in_folder(&patient_folder).await?;
        documents.extend(self.list_files_in_folder(&guideline_folder).await?);
        Ok(documents)
    }

    async fn list_files_in_folder(
        &self,
        folder_id: &str,
    ) -> std::result::Result<Vec<DocumentRef>, StoreError> {
        let source = self.source_for_folder(folder_id);
        let files = self.list_folder(folder_id).await?;

        Ok(files
            .into_iter()
            .map(|f| DocumentRef::new(f.id, f.name, f.mime_type, source))
            .collect())
    }

    async fn get_file_content(
        &self,
        doc: &DocumentRef,
    ) -> std::result::Result<String, StoreError> {
        let request = if Self::is_google_native(&doc.mime_type) {
            let url = format!("{}/files/{}/export", self.base_url, doc.id);
            self.client.get(&url).query(&[("mimeType", "text/plain")])
        } else {
            let url = format!("{}/files/{}", self.base_url, doc.id);
            self.client.get(&url).query(&[("alt", "media")])
        };

        // Content failures never propagate: a missing or unreadable
        // document becomes an empty string and the caller carries on.
        let response = match self.send(self.authorize(request)).await {
            Ok(response) => response,
            Err(err) => {
                warn!(name = %doc.name, error = %err, "content fetch failed, substituting empty text");
                return Ok(String::new());
            }
        };

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(name = %doc.name, error = %err, "content read failed, substituting empty text");
                return Ok(String::new());
            }
        };

        match String::from_utf8(bytes.to_vec()) {
            Ok(text) => Ok(text),
            Err(_) => {
                warn!(
                    name = %doc.name,
                    mime_type = %doc.mime_type,
                    "no text extraction for binary content, substituting empty text"
                );
                Ok(String::new())
            }
        }
    }

    async fn guideline_files(&self) -> std::result::Result<Vec<DocumentRef>, StoreError> {
        let guideline_folder = self.folders.guidelines.clone();
        self.list_files_in_folder(&guideline_folder).await
    }
}

// ─── Wire types (private) ───

#[derive(Debug, Deserialize)]
struct FileListResponse {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    name: String,
    #[serde(rename = "mimeType", default)]
    mime_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> DriveStore {
        DriveStore::new(DriveFolders::new("folder-pd", "folder-gl", "folder-fw"))
    }

    #[test]
    fn store_name() {
        assert_eq!(store().name(), "drive");
    }

    #[test]
    fn folder_query_matches_drive_syntax() {
        assert_eq!(
            DriveStore::folder_query("abc123"),
            "'abc123' in parents and trashed = false"
        );
    }

    #[test]
    fn sources_resolve_from_well_known_folders() {
        let store = store();
        assert_eq!(store.source_for_folder("folder-pd"), DocumentSource::PatientData);
        assert_eq!(store.source_for_folder("folder-gl"), DocumentSource::Guidelines);
        assert_eq!(store.source_for_folder("folder-fw"), DocumentSource::PromptFramework);
        assert_eq!(store.source_for_folder("elsewhere"), DocumentSource::Unclassified);
    }

    #[test]
    fn base_url_trims_trailing_slash() {
        let store = store().with_base_url("http://localhost:9999/drive/");
        assert_eq!(store.base_url, "http://localhost:9999/drive");
    }

    #[test]
    fn google_native_mime_types_are_exported() {
        assert!(DriveStore::is_google_native("application/vnd.google-apps.document"));
        assert!(DriveStore::is_google_native("application/vnd.google-apps.spreadsheet"));
        assert!(!DriveStore::is_google_native("application/pdf"));
        assert!(!DriveStore::is_google_native("text/plain"));
        assert!(!DriveStore::is_google_native(""));
    }

    #[test]
    fn listing_parses_drive_file_fields() {
        let body = r#"{
            "files": [
                {"id": "f1", "name": "report.txt", "mimeType": "text/plain"},
                {"id": "f2", "name": "guide.pdf", "mimeType": "application/pdf"}
            ]
        }"#;
        let listing: FileListResponse = serde_json::from_str(body).unwrap();
        assert_eq!(listing.files.len(), 2);
        assert_eq!(listing.files[0].id, "f1");
        assert_eq!(listing.files[0].mime_type, "text/plain");
        assert_eq!(listing.files[1].name, "guide.pdf");
    }

    #[test]
    fn listing_tolerates_missing_fields() {
        let listing: FileListResponse = serde_json::from_str("{}").unwrap();
        assert!(listing.files.is_empty());

        let body = r#"{"files": [{"id": "f1", "name": "mystery"}]}"#;
        let listing: FileListResponse = serde_json::from_str(body).unwrap();
        assert_eq!(listing.files[0].mime_type, "");
    }
}
