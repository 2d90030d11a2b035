//! Durable storage of the session credential.
//!
//! The token and the user are always written and cleared as one
//! [`StoredSession`] record, so no backend can ever hold one without the
//! other.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use ams_shared::account::User;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// The persisted token and user pair.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    pub token: String,
    pub user: User,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed session record: {0}")]
    Format(#[from] serde_json::Error),
}

/// A get/set/clear store for the session record.
pub trait SessionStorage: Send + Sync {
    fn get(&self) -> Result<Option<StoredSession>, Error>;

    fn set(&self, session: &StoredSession) -> Result<(), Error>;

    fn clear(&self) -> Result<(), Error>;
}

/// Keeps the session in memory only, lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: Mutex<Option<StoredSession>>,
}

impl MemoryStorage {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    #[inline]
    fn get(&self) -> Result<Option<StoredSession>, Error> {
        Ok(self.inner.lock().clone())
    }

    #[inline]
    fn set(&self, session: &StoredSession) -> Result<(), Error> {
        *self.inner.lock() = Some(session.clone());
        Ok(())
    }

    #[inline]
    fn clear(&self) -> Result<(), Error> {
        *self.inner.lock() = None;
        Ok(())
    }
}

/// Keeps the session as a JSON file.
///
/// Writes go to a sibling temporary file which is then renamed over the
/// record, so readers see either the old or the new pair.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    #[inline]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionStorage for FileStorage {
    fn get(&self) -> Result<Option<StoredSession>, Error> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, session: &StoredSession) -> Result<(), Error> {
        let parent = self.path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(parent) = parent {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = self.tmp_path();
        std::fs::write(&tmp, serde_json::to_vec(session)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        match std::fs::remove_file(&self.path) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}
