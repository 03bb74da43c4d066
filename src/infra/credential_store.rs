//! Usage: Persist the single Basic credential across restarts (file-backed and in-memory stores).

use crate::auth::Credential;
use crate::shared::error::{AppError, AppResult};
use crate::shared::fs::{read_optional_string, remove_file_if_exists, write_file_atomic};
use crate::shared::mutex_ext::MutexExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const CREDENTIAL_KEY: &str = "auth_basic";

pub trait CredentialStore: Send + Sync {
    /// Read failures count as "no credential".
    fn load(&self) -> Option<Credential>;
    fn save(&self, credential: &Credential) -> AppResult<()>;
    /// Best-effort; failures are logged and swallowed.
    fn clear(&self);
}

pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(CREDENTIAL_KEY),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Option<Credential> {
        match read_optional_string(&self.path) {
            Ok(Some(raw)) => Credential::from_token(raw.trim()),
            Ok(None) => None,
            Err(err) => {
                tracing::warn!("credential read failed: {}", err);
                None
            }
        }
    }

    fn save(&self, credential: &Credential) -> AppResult<()> {
        write_file_atomic(&self.path, credential.token().as_bytes()).map_err(AppError::Storage)
    }

    fn clear(&self) {
        if let Err(err) = remove_file_if_exists(&self.path) {
            tracing::warn!("credential clear failed: {}", err);
        }
    }
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: Mutex::new(Some(credential)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Option<Credential> {
        self.slot.lock_or_recover().clone()
    }

    fn save(&self, credential: &Credential) -> AppResult<()> {
        *self.slot.lock_or_recover() = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) {
        self.slot.lock_or_recover().take();
    }
}
