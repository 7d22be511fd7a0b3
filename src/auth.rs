//! Installed-application OAuth2 authentication for Google APIs.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use chrono::Utc;
use reqwest::Client;
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

use crate::error::{DriveError, Result};
use crate::models::{ClientSecret, Token, TokenResponse};
use crate::token_cache::TokenCache;

/// Google Drive API scope.
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// State sent with the authorization URL. The code is pasted back by hand,
/// so there is no callback to check it against.
const AUTH_STATE: &str = "state-token";

/// OAuth client configuration built from a client secret file.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

impl OAuthConfig {
    /// Load a client secret JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P, scopes: &[&str]) -> Result<Self> {
        let content = fs::read(path)?;
        Self::from_json(&content, scopes)
    }

    /// Parse a client secret in either the `installed` or the `web` layout.
    pub fn from_json(json: &[u8], scopes: &[&str]) -> Result<Self> {
        let secret: ClientSecret = serde_json::from_slice(json)?;
        let detail = secret
            .into_detail()
            .ok_or(DriveError::InvalidClientSecretError)?;

        Ok(Self {
            client_id: detail.client_id,
            client_secret: detail.client_secret,
            auth_uri: detail.auth_uri,
            token_uri: detail.token_uri,
            redirect_uri: detail.redirect_uris.into_iter().next().unwrap_or_default(),
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// URL the user visits to grant access and obtain an authorization code.
    pub fn auth_code_url(&self) -> Result<String> {
        let mut url = Url::parse(&self.auth_uri)?;
        url.query_pairs_mut()
            .append_pair("access_type", "offline")
            .append_pair("client_id", self.client_id.as_str())
            .append_pair("redirect_uri", self.redirect_uri.as_str())
            .append_pair("response_type", "code")
            .append_pair("scope", &self.scopes.join(" "))
            .append_pair("state", AUTH_STATE);
        Ok(url.to_string())
    }

    /// Exchange an authorization code for a token.
    pub async fn exchange(&self, http: &Client, code: &str) -> Result<Token> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let response = http.post(&self.token_uri).form(&params).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DriveError::TokenExchangeError(format!(
                "Status {}: {}",
                status, body
            )));
        }

        let token_response: TokenResponse = response.json().await?;
        Ok(Token::from_response(token_response, Utc::now()))
    }

    /// Obtain a fresh access token from a refresh token.
    ///
    /// The refresh token is carried over when the response omits a new one.
    pub async fn refresh(&self, http: &Client, refresh_token: &str) -> Result<Token> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let response = http.post(&self.token_uri).form(&params).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DriveError::TokenRefreshError(format!(
                "Status {}: {}",
                status, body
            )));
        }

        let token_response: TokenResponse = response.json().await?;
        let mut token = Token::from_response(token_response, Utc::now());
        if token.refresh_token.is_none() {
            token.refresh_token = Some(refresh_token.to_string());
        }
        Ok(token)
    }
}

/// Supplies an authorization code for a given authorization URL.
pub trait CodeSource {
    fn authorization_code(&mut self, auth_url: &str) -> Result<String>;
}

impl<F> CodeSource for F
where
    F: FnMut(&str) -> Result<String>,
{
    fn authorization_code(&mut self, auth_url: &str) -> Result<String> {
        self(auth_url)
    }
}

/// Prints the authorization URL and reads the code from stdin.
pub struct ConsolePrompt;

impl CodeSource for ConsolePrompt {
    fn authorization_code(&mut self, auth_url: &str) -> Result<String> {
        println!(
            "Go to the following link in your browser then type the authorization code: \n{}",
            auth_url
        );
        io::stdout().flush()?;

        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| DriveError::AuthorizationCodeError(e.to_string()))?;

        let code = line.trim();
        if read == 0 || code.is_empty() {
            return Err(DriveError::AuthorizationCodeError(
                "no code entered".to_string(),
            ));
        }
        Ok(code.to_string())
    }
}

/// Holds the current token and refreshes it when it expires.
pub struct Authenticator {
    config: OAuthConfig,
    cache: TokenCache,
    client: Client,
    token: RwLock<Token>,
}

impl Authenticator {
    /// Build an authenticator around an already obtained token.
    pub fn new(config: OAuthConfig, cache: TokenCache, token: Token) -> Self {
        Self {
            config,
            cache,
            client: Client::new(),
            token: RwLock::new(token),
        }
    }

    /// Reuse the cached token, or run the interactive flow once and cache
    /// its result.
    pub async fn obtain<C: CodeSource>(
        config: OAuthConfig,
        cache: TokenCache,
        prompt: &mut C,
    ) -> Result<Self> {
        let client = Client::new();
        let token = match cache.load().filter(|t| t.is_usable_at(Utc::now())) {
            Some(token) => {
                info!(path = %cache.path().display(), "using cached token");
                token
            }
            None => {
                let auth_url = config.auth_code_url()?;
                let code = prompt.authorization_code(&auth_url)?;
                let token = config.exchange(&client, &code).await?;

                println!("Saving credential file to: {}", cache.path().display());
                cache.save(&token)?;
                token
            }
        };

        Ok(Self {
            config,
            cache,
            client,
            token: RwLock::new(token),
        })
    }

    /// Get a valid access token, refreshing if necessary.
    pub async fn access_token(&self) -> Result<String> {
        {
            let token = self.token.read().await;
            if token.is_valid_at(Utc::now()) {
                return Ok(token.access_token.clone());
            }
        }

        let mut token = self.token.write().await;
        // Another caller may have refreshed while we waited for the lock.
        if token.is_valid_at(Utc::now()) {
            return Ok(token.access_token.clone());
        }

        let refresh_token = token
            .refresh_token
            .clone()
            .ok_or_else(|| DriveError::TokenRefreshError("token expired and has no refresh token".to_string()))?;

        debug!("refreshing access token");
        let refreshed = self.config.refresh(&self.client, &refresh_token).await?;
        self.cache.save(&refreshed)?;
        *token = refreshed;

        Ok(token.access_token.clone())
    }
}
