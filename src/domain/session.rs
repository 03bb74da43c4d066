//! Usage: Explicit session object (credential lifecycle shared by every authenticated screen).

use crate::auth::Credential;
use crate::credential_store::CredentialStore;
use crate::shared::error::{AppError, AppResult};
use crate::shared::mutex_ext::MutexExt;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Unknown,
    HasCredential,
    NoCredential,
}

pub struct Session {
    store: Arc<dyn CredentialStore>,
    current: Mutex<Option<Option<Credential>>>,
}

impl Session {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            current: Mutex::new(None),
        }
    }

    /// Loads the stored credential once; later calls return the cached state.
    pub fn bootstrap(&self) -> SessionState {
        let mut current = self.current.lock_or_recover();
        if current.is_none() {
            let loaded = self.store.load();
            tracing::debug!(has_credential = loaded.is_some(), "session bootstrapped");
            *current = Some(loaded);
        }
        state_of(&current)
    }

    /// Re-reads the store, picking up a login or logout made elsewhere.
    pub fn reload(&self) -> SessionState {
        let loaded = self.store.load();
        let mut current = self.current.lock_or_recover();
        *current = Some(loaded);
        state_of(&current)
    }

    pub fn state(&self) -> SessionState {
        state_of(&self.current.lock_or_recover())
    }

    pub fn credential(&self) -> Option<Credential> {
        self.current.lock_or_recover().clone().flatten()
    }

    /// Like [`Session::credential`], but bootstraps first and reports a missing credential.
    pub fn require_credential(&self) -> AppResult<Credential> {
        self.bootstrap();
        self.credential().ok_or_else(AppError::session)
    }

    pub fn save(&self, credential: Credential) -> AppResult<()> {
        self.store.save(&credential)?;
        *self.current.lock_or_recover() = Some(Some(credential));
        Ok(())
    }

    pub fn clear(&self) {
        self.store.clear();
        *self.current.lock_or_recover() = Some(None);
    }
}

fn state_of(current: &Option<Option<Credential>>) -> SessionState {
    match current {
        None => SessionState::Unknown,
        Some(Some(_)) => SessionState::HasCredential,
        Some(None) => SessionState::NoCredential,
    }
}
