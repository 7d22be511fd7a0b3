//! Data models for Google Drive API and OAuth responses.

use chrono::{DateTime, Datelike, Duration, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A token is treated as expired this long before its recorded expiry.
const EXPIRY_SKEW_SECS: i64 = 10;

/// A file listed from a Drive folder (Drive API v2 shape).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_size")]
    pub file_size: Option<u64>,
}

fn deserialize_size<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) => s.parse::<u64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

impl std::fmt::Display for DriveFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let size_str = self
            .file_size
            .map(format_size)
            .unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "{} ({})\t{}",
            self.title,
            self.download_url.as_deref().unwrap_or("-"),
            size_str
        )
    }
}

/// Format bytes into human-readable size.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Response from the v2 files.list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub items: Vec<DriveFile>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Google API error response.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub code: u16,
    pub message: String,
}

/// OAuth client secret file as downloaded from the Google Cloud console.
///
/// Desktop clients nest their fields under `installed`, web clients under `web`.
#[derive(Debug, Deserialize)]
pub struct ClientSecret {
    #[serde(default)]
    pub installed: Option<ClientSecretDetail>,
    #[serde(default)]
    pub web: Option<ClientSecretDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecretDetail {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

impl ClientSecret {
    pub fn into_detail(self) -> Option<ClientSecretDetail> {
        self.installed.or(self.web)
    }
}

/// OAuth2 token as stored in the token cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl Token {
    /// Build a token from a token endpoint response received at `now`.
    pub fn from_response(response: TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            access_token: response.access_token,
            token_type: response.token_type.unwrap_or_else(default_token_type),
            refresh_token: response.refresh_token,
            expiry: response
                .expires_in
                .filter(|secs| *secs > 0)
                .and_then(TimeDelta::try_seconds)
                .and_then(|lifetime| now.checked_add_signed(lifetime)),
        }
    }

    /// Whether the token expires before `now` plus a small skew.
    ///
    /// A missing expiry, or the zero timestamp some writers emit for one,
    /// never expires.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiry.filter(|t| t.year() > 1) {
            Some(expiry) => expiry - Duration::seconds(EXPIRY_SKEW_SECS) < now,
            None => false,
        }
    }

    /// Whether the token can be sent as is.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.access_token.is_empty() && !self.is_expired_at(now)
    }

    /// Whether the token can be sent as is or refreshed without user input.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.is_valid_at(now) || self.refresh_token.as_deref().is_some_and(|r| !r.is_empty())
    }
}

/// OAuth2 token endpoint response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}
