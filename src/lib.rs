//! drive_drain - Move every file out of a Google Drive folder.
//!
//! This library provides functionality to:
//! - Authorize with an installed-application OAuth client, caching the token
//! - List the files in a Drive folder
//! - Download each file locally, then delete it from Drive
//!
//! # Example
//!
//! ```no_run
//! use drive_drain::{drain_folder, Authenticator, ConsolePrompt, DriveClient, OAuthConfig, TokenCache};
//! use drive_drain::auth::DRIVE_SCOPE;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = OAuthConfig::from_file("credentials.json", &[DRIVE_SCOPE])?;
//!     let auth = Authenticator::obtain(config, TokenCache::new("token.json"), &mut ConsolePrompt).await?;
//!     let client = DriveClient::new(auth);
//!
//!     let report = drain_folder(&client, "folder-id", std::path::Path::new(".")).await?;
//!     println!("{} file(s)", report.files);
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod sync;
pub mod token_cache;

// Re-exports for convenience
pub use auth::{Authenticator, CodeSource, ConsolePrompt, OAuthConfig};
pub use client::DriveClient;
pub use error::{DriveError, Result};
pub use models::{DriveFile, Token};
pub use sync::{drain_folder, DrainReport, RemoteStore};
pub use token_cache::TokenCache;
