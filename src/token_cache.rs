//! On-disk cache for the OAuth token.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Result;
use crate::models::Token;

/// A JSON token file, readable and writable by its owner only.
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached token.
    ///
    /// A missing file, an unreadable file and a file that is not a token all
    /// mean there is no cached token.
    pub fn load(&self) -> Option<Token> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "no token cache");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(token) => Some(token),
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "ignoring malformed token cache");
                None
            }
        }
    }

    /// Write the token, replacing any previous content.
    pub fn save(&self, token: &Token) -> Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)?;
        serde_json::to_writer(&mut file, token)?;
        file.write_all(b"\n")?;
        file.flush()?;

        info!(path = %self.path.display(), "token cached");
        Ok(())
    }
}
