// Durable session storage
//
// Login and signup persist the issued session so a later run can restore
// authentication without prompting again; logout clears it.

use std::fs;
use std::sync::Mutex;

use camino::{Utf8Path, Utf8PathBuf};

use crate::api::ApiError;
use crate::models::AuthSession;

pub const SESSION_FILE: &str = "session.json";

#[cfg_attr(test, mockall::automock)]
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> Result<Option<AuthSession>, ApiError>;

    fn save(&self, session: &AuthSession) -> Result<(), ApiError>;

    fn clear(&self) -> Result<(), ApiError>;
}

/// Stores the session as JSON in `<data_dir>/session.json`.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: Utf8PathBuf,
}

impl FileSessionStorage {
    pub fn new<P: AsRef<Utf8Path>>(data_dir: P) -> Self {
        Self {
            path: data_dir.as_ref().join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Result<Option<AuthSession>, ApiError> {
        if !self.path.exists() {
            tracing::debug!("No persisted session at {}", self.path);
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .map_err(|e| ApiError::Storage(format!("Failed to read {}: {e}", self.path)))?;

        match serde_json::from_str(&contents) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // a corrupt file is treated as logged out rather than fatal
                tracing::warn!("Ignoring unreadable session file {}: {}", self.path, e);
                Ok(None)
            }
        }
    }

    fn save(&self, session: &AuthSession) -> Result<(), ApiError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_str().is_empty() && !d.exists()) {
            fs::create_dir_all(dir)
                .map_err(|e| ApiError::Storage(format!("Failed to create {dir}: {e}")))?;
        }

        let json = serde_json::to_string_pretty(session)
            .map_err(|e| ApiError::Storage(format!("Failed to encode session: {e}")))?;
        fs::write(&self.path, json)
            .map_err(|e| ApiError::Storage(format!("Failed to write {}: {e}", self.path)))?;

        tracing::info!("Saved session for {} to {}", session.user.email, self.path);
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .map_err(|e| ApiError::Storage(format!("Failed to remove {}: {e}", self.path)))?;
            tracing::info!("Cleared session at {}", self.path);
        }
        Ok(())
    }
}

/// Keeps the session in memory only.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    session: Mutex<Option<AuthSession>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: AuthSession) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Result<Option<AuthSession>, ApiError> {
        Ok(self.session.lock().unwrap_or_else(|p| p.into_inner()).clone())
    }

    fn save(&self, session: &AuthSession) -> Result<(), ApiError> {
        *self.session.lock().unwrap_or_else(|p| p.into_inner()) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        *self.session.lock().unwrap_or_else(|p| p.into_inner()) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, User};
    use tempfile::TempDir;

    fn session() -> AuthSession {
        AuthSession {
            user: User {
                id: "U1".into(),
                name: "Ada".into(),
                email: "a@b.com".into(),
                role: Role::JobSeeker,
                verification_status: None,
                created_at: None,
            },
            token: "tok".into(),
        }
    }

    fn storage() -> (FileSessionStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp_dir.path().join("data")).unwrap();
        (FileSessionStorage::new(dir), temp_dir)
    }

    #[test]
    fn test_load_missing_is_none() {
        let (storage, _temp_dir) = storage();
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_save_load_clear() {
        let (storage, _temp_dir) = storage();

        storage.save(&session()).unwrap();
        assert!(storage.path().exists());
        assert_eq!(storage.load().unwrap(), Some(session()));

        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
        storage.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file_is_ignored() {
        let (storage, _temp_dir) = storage();
        fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
        fs::write(storage.path(), "not json").unwrap();

        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemorySessionStorage::new();
        storage.save(&session()).unwrap();
        assert!(storage.load().unwrap().is_some());
        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
    }
}
