//! Credential cache holding a single temporary credential record

use super::TemporaryCredential;
use crate::error::CacheError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::debug;

/// Storage for the one cached credential
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read the record; `NotFound` if absent, `Corrupt` if unparseable
    async fn load(&self) -> Result<TemporaryCredential, CacheError>;

    /// Replace the record
    async fn store(&self, credential: &TemporaryCredential) -> Result<(), CacheError>;

    /// Delete the record; absence is not an error
    async fn purge(&self) -> Result<(), CacheError>;

    /// Where the record lives, for messages
    fn location(&self) -> String;
}

#[async_trait]
impl<T: CredentialStore + ?Sized> CredentialStore for std::sync::Arc<T> {
    async fn load(&self) -> Result<TemporaryCredential, CacheError> {
        (**self).load().await
    }
    async fn store(&self, credential: &TemporaryCredential) -> Result<(), CacheError> {
        (**self).store(credential).await
    }
    async fn purge(&self) -> Result<(), CacheError> {
        (**self).purge().await
    }
    fn location(&self) -> String {
        (**self).location()
    }
}

/// JSON file store with 0600 permissions
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    async fn load(&self) -> Result<TemporaryCredential, CacheError> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CacheError::NotFound(self.path.clone()));
            }
            Err(e) => {
                return Err(CacheError::io(
                    format!("reading cache file {}", self.path.display()),
                    e,
                ));
            }
        };

        let credential: TemporaryCredential =
            serde_json::from_slice(&content).map_err(|e| CacheError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        if credential.access_key_id.is_empty() || credential.secret_access_key.is_empty() {
            return Err(CacheError::Corrupt {
                path: self.path.clone(),
                reason: "empty access key".to_string(),
            });
        }

        debug!("Loaded cached credential from {}", self.path.display());
        Ok(credential)
    }

    async fn store(&self, credential: &TemporaryCredential) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                CacheError::io(format!("creating cache directory {}", parent.display()), e)
            })?;
        }

        let content = serde_json::to_vec_pretty(credential)
            .map_err(|e| CacheError::io("serializing credential", e.into()))?;

        // Write beside the target and rename so readers never see a partial record.
        let temp = self.temp_path();
        let written = match write_private(&temp, &content).await {
            Ok(()) => fs::rename(&temp, &self.path).await.map_err(|e| {
                CacheError::io(format!("replacing cache file {}", self.path.display()), e)
            }),
            Err(e) => Err(CacheError::io(
                format!("writing cache file {}", temp.display()),
                e,
            )),
        };

        if let Err(e) = written {
            // The temp file holds the secret.
            fs::remove_file(&temp).await.ok();
            return Err(e);
        }

        debug!(
            "Cached credential {} at {}",
            credential.access_key_id,
            self.path.display()
        );
        Ok(())
    }

    async fn purge(&self) -> Result<(), CacheError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!("Removed cache file {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::io(
                format!("removing cache file {}", self.path.display()),
                e,
            )),
        }
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Create or truncate `path` readable by the owner only, then write `content`
async fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;

    // A leftover temp file keeps its old mode through open.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .await?;
    }

    file.write_all(content).await?;
    file.sync_all().await
}

/// In-memory store, for tests and callers that never want a file on disk
#[derive(Default)]
pub struct MemoryStore {
    record: RwLock<Option<TemporaryCredential>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a credential already cached
    pub fn with_credential(credential: TemporaryCredential) -> Self {
        Self {
            record: RwLock::new(Some(credential)),
        }
    }

    /// Current record without going through the trait
    pub async fn snapshot(&self) -> Option<TemporaryCredential> {
        self.record.read().await.clone()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn load(&self) -> Result<TemporaryCredential, CacheError> {
        self.record
            .read()
            .await
            .clone()
            .ok_or_else(|| CacheError::NotFound(PathBuf::from(self.location())))
    }

    async fn store(&self, credential: &TemporaryCredential) -> Result<(), CacheError> {
        *self.record.write().await = Some(credential.clone());
        Ok(())
    }

    async fn purge(&self) -> Result<(), CacheError> {
        self.record.write().await.take();
        Ok(())
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}
