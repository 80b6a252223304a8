//! Credential persisted as a small JSON file.
//!
//! The file holds a single well-known key: `{"token": "..."}`. The default
//! location is `~/.genesis/credentials.json`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::auth::Credential;
use crate::traits::{CredentialsError, CredentialsProvider};

const CREDENTIALS_DIR: &str = ".genesis";
const CREDENTIALS_FILE: &str = "credentials.json";

/// The only key in the credentials file.
pub const TOKEN_KEY: &str = "token";

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<Credential>,
}

#[derive(Debug, Clone)]
pub struct FileCredentialsProvider {
    path: PathBuf,
}

impl FileCredentialsProvider {
    /// Use `~/.genesis/credentials.json`.
    pub fn new() -> Result<Self, CredentialsError> {
        let home = dirs::home_dir()
            .ok_or_else(|| CredentialsError::Unavailable("no home directory".to_string()))?;
        Ok(Self::with_path(home.join(CREDENTIALS_DIR).join(CREDENTIALS_FILE)))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn credentials_path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

#[async_trait]
impl CredentialsProvider for FileCredentialsProvider {
    /// A missing file, or one whose token is empty, is `Ok(None)`.
    async fn load(&self) -> Result<Option<Credential>, CredentialsError> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CredentialsError::LoadFailed(e.to_string())),
        };
        let file: CredentialsFile = serde_json::from_slice(&raw)
            .map_err(|e| CredentialsError::LoadFailed(e.to_string()))?;
        Ok(file.token.filter(|t| !t.is_empty()))
    }

    /// Written to a sibling file first and renamed into place, so a crash
    /// mid-write never leaves a truncated credential behind.
    async fn save(&self, credential: &Credential) -> Result<(), CredentialsError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| CredentialsError::Unavailable(e.to_string()))?;
        }
        let body = serde_json::to_vec_pretty(&CredentialsFile {
            token: Some(credential.clone()),
        })
        .map_err(|e| CredentialsError::SaveFailed(e.to_string()))?;

        let staging = self.staging_path();
        fs::write(&staging, body)
            .await
            .map_err(|e| CredentialsError::SaveFailed(e.to_string()))?;
        fs::rename(&staging, &self.path)
            .await
            .map_err(|e| CredentialsError::SaveFailed(e.to_string()))
    }

    async fn clear(&self) -> Result<(), CredentialsError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CredentialsError::ClearFailed(e.to_string())),
        }
    }
}
