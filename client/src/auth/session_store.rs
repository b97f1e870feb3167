//! Persistence for the authenticated session.
//!
//! Three entries are kept together: the serialized user profile, the access
//! token and the refresh token. They are always written and removed as one
//! unit; the file store writes a temp file and renames it over the old one.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::auth::models::Session;
use crate::errors::{ServiceError, ServiceResult};
use crate::models::User;

pub const USER_KEY: &str = "to-off-user";
pub const ACCESS_TOKEN_KEY: &str = "to-off-access-token";
pub const REFRESH_TOKEN_KEY: &str = "to-off-refresh-token";

/// Raw stored entries. Any of them may be missing in a damaged store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    /// Serialized `User` JSON, stored as a string like the other entries
    #[serde(rename = "to-off-user", default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(
        rename = "to-off-access-token",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub access_token: Option<String>,
    #[serde(
        rename = "to-off-refresh-token",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub refresh_token: Option<String>,
}

impl PersistedSession {
    pub fn from_session(session: &Session) -> ServiceResult<Self> {
        let user = serde_json::to_string(&session.user)
            .map_err(|e| ServiceError::storage(format!("Failed to serialize user: {}", e)))?;

        Ok(Self {
            user: Some(user),
            access_token: Some(session.access_token.clone()),
            refresh_token: session.refresh_token.clone(),
        })
    }

    /// A session can only be restored when both the profile and the access
    /// token are present and the profile parses.
    pub fn into_session(self) -> Option<Session> {
        let access_token = self.access_token.filter(|token| !token.is_empty())?;
        let user: User = match serde_json::from_str(self.user.as_deref()?) {
            Ok(user) => user,
            Err(e) => {
                warn!("Stored user profile is unreadable: {}", e);
                return None;
            }
        };

        Some(Session {
            access_token,
            refresh_token: self.refresh_token.filter(|token| !token.is_empty()),
            user,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.access_token.is_none() && self.refresh_token.is_none()
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns `None` when nothing is stored.
    async fn load(&self) -> ServiceResult<Option<PersistedSession>>;

    /// Replaces all entries at once.
    async fn save(&self, session: &PersistedSession) -> ServiceResult<()>;

    /// Removes all entries at once.
    async fn clear(&self) -> ServiceResult<()>;
}

/// JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
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
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "session.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> ServiceResult<Option<PersistedSession>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ServiceError::storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        match serde_json::from_str::<PersistedSession>(&contents) {
            Ok(persisted) if persisted.is_empty() => Ok(None),
            Ok(persisted) => Ok(Some(persisted)),
            Err(e) => {
                warn!(
                    "Session file {} is corrupt, ignoring it: {}",
                    self.path.display(),
                    e
                );
                Ok(Some(PersistedSession::default()))
            }
        }
    }

    async fn save(&self, session: &PersistedSession) -> ServiceResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    ServiceError::storage(format!("Failed to create {}: {}", parent.display(), e))
                })?;
            }
        }

        let contents = serde_json::to_string_pretty(session)
            .map_err(|e| ServiceError::storage(format!("Failed to serialize session: {}", e)))?;

        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, contents)
            .await
            .map_err(|e| ServiceError::storage(format!("Failed to write session: {}", e)))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| ServiceError::storage(format!("Failed to replace session: {}", e)))?;

        debug!("Session written to {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> ServiceResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ServiceError::storage(format!(
                "Failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

/// In-process store; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<Option<PersistedSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: PersistedSession) -> Self {
        Self {
            entries: Mutex::new(Some(entries)),
        }
    }

    pub async fn snapshot(&self) -> Option<PersistedSession> {
        self.entries.lock().await.clone()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> ServiceResult<Option<PersistedSession>> {
        Ok(self.entries.lock().await.clone())
    }

    async fn save(&self, session: &PersistedSession) -> ServiceResult<()> {
        *self.entries.lock().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> ServiceResult<()> {
        *self.entries.lock().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::comum;

    fn session() -> Session {
        Session {
            access_token: "access".into(),
            refresh_token: Some("refresh".into()),
            user: comum(11122233344, 3),
        }
    }

    #[test]
    fn test_round_trip_through_entries() {
        let persisted = PersistedSession::from_session(&session()).unwrap();
        assert_eq!(persisted.into_session(), Some(session()));
    }

    #[test]
    fn test_half_populated_entries_do_not_restore() {
        let mut persisted = PersistedSession::from_session(&session()).unwrap();
        persisted.access_token = None;
        assert_eq!(persisted.into_session(), None);

        let token_only = PersistedSession {
            user: None,
            access_token: Some("access".into()),
            refresh_token: Some("refresh".into()),
        };
        assert_eq!(token_only.into_session(), None);

        let garbage_profile = PersistedSession {
            user: Some("{not json".into()),
            access_token: Some("access".into()),
            refresh_token: None,
        };
        assert_eq!(garbage_profile.into_session(), None);
    }

    #[tokio::test]
    async fn test_file_store_writes_and_clears_all_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));

        assert_eq!(store.load().await.unwrap(), None);

        let persisted = PersistedSession::from_session(&session()).unwrap();
        store.save(&persisted).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains(USER_KEY));
        assert!(raw.contains(ACCESS_TOKEN_KEY));
        assert!(raw.contains(REFRESH_TOKEN_KEY));
        assert_eq!(store.load().await.unwrap(), Some(persisted));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
        // clearing twice is fine
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_as_empty_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{{{").unwrap();

        let store = FileSessionStore::new(&path);
        let loaded = store.load().await.unwrap().unwrap();
        assert!(loaded.is_empty());
        assert_eq!(loaded.into_session(), None);
    }
}
