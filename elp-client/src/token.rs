//! On-disk cache of the login bearer token.
//!
//! The portal obtains the token at login and restores it on startup so the
//! user stays signed in between runs. This module does not mint or refresh
//! tokens; it only persists what the login flow hands it.

use std::path::PathBuf;

/// Persists the bearer token at a fixed path.
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn temp_path(&self) -> PathBuf {
        let mut file_name = std::ffi::OsString::from("_temp_");
        file_name.push(self.path.file_name().unwrap_or_default());
        self.path.with_file_name(file_name)
    }

    /// Restores the cached token. A missing or unreadable cache is treated
    /// as "not logged in".
    pub async fn load(&self) -> Option<String> {
        let contents = tokio::fs::read_to_string(&self.path).await.ok()?;
        let token = contents.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    /// Stores the token. The write goes to a temporary sibling first and is
    /// then renamed into place, so a crash mid-write cannot leave a partial
    /// token behind.
    pub async fn store(&self, token: &str) -> std::io::Result<()> {
        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, token).await?;
        tokio::fs::rename(temp_path, &self.path).await
    }

    /// Forgets the cached token, e.g. on logout. Clearing an already-empty
    /// cache succeeds.
    pub async fn clear(&self) -> std::io::Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}
