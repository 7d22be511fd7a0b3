//! Google Drive API client for listing, downloading and deleting files.

use std::path::Path;

use futures::StreamExt;
use reqwest::{Client, Response};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::auth::Authenticator;
use crate::error::{DriveError, Result};
use crate::models::{ApiErrorResponse, DriveFile, FileList};

/// Base URL for Google Drive API v2.
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v2";

/// Client for a user's Google Drive.
pub struct DriveClient {
    auth: Authenticator,
    http: Client,
    api_base: String,
}

impl DriveClient {
    /// Create a new DriveClient against the public Drive API.
    pub fn new(auth: Authenticator) -> Self {
        Self::with_api_base(auth, DRIVE_API_BASE)
    }

    /// Create a DriveClient against a different API base URL.
    pub fn with_api_base(auth: Authenticator, api_base: impl Into<String>) -> Self {
        Self {
            auth,
            http: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// List the non-trashed direct children of a folder.
    ///
    /// Only the first page of results is returned.
    pub async fn list_children(&self, parent_id: &str) -> Result<Vec<DriveFile>> {
        let query = format!(
            "trashed = false and parents in '{}'",
            parent_id.replace('\'', "\\'")
        );
        let token = self.auth.access_token().await?;

        debug!(%query, "listing files");
        let response = self
            .http
            .get(format!("{}/files", self.api_base))
            .bearer_auth(&token)
            .query(&[("q", query.as_str())])
            .send()
            .await?;

        let list: FileList = check_status(response).await?.json().await?;
        if list.next_page_token.is_some() {
            warn!(
                parent_id,
                listed = list.items.len(),
                "folder has more pages, only the first one is processed"
            );
        }

        Ok(list.items)
    }

    /// Stream a file's content to a local path, returning the byte count.
    pub async fn download(&self, file: &DriveFile, destination: &Path) -> Result<u64> {
        let url = file
            .download_url
            .as_deref()
            .ok_or_else(|| DriveError::MissingDownloadUrl(file.title.clone()))?;
        let token = self.auth.access_token().await?;

        debug!(id = %file.id, "downloading");
        let response = self.http.get(url).bearer_auth(&token).send().await?;
        let response = check_status(response).await?;

        let mut out = File::create(destination).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            out.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        out.flush().await?;

        Ok(written)
    }

    /// Delete a file by ID.
    pub async fn delete_file(&self, file_id: &str) -> Result<()> {
        let token = self.auth.access_token().await?;

        debug!(id = %file_id, "deleting");
        let response = self
            .http
            .delete(format!("{}/files/{}", self.api_base, file_id))
            .bearer_auth(&token)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }
}

/// Turn a non-success response into an API error, preferring the message from
/// Google's error envelope.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&error_body) {
        return Err(DriveError::ApiError {
            status: api_error.error.code,
            message: api_error.error.message,
        });
    }
    Err(DriveError::ApiError {
        status: status.as_u16(),
        message: error_body,
    })
}
