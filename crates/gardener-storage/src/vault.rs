//! High-level API over the session store.

use crate::{SessionStore, StorageError, StorageKeys, StorageResult};
use serde::{Deserialize, Serialize};

/// Which authentication method currently owns the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Passkey-backed smart account.
    Passkey,
    /// External wallet connection.
    Wallet,
}

impl AuthMode {
    fn as_str(&self) -> &'static str {
        match self {
            AuthMode::Passkey => "passkey",
            AuthMode::Wallet => "wallet",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "passkey" => Some(AuthMode::Passkey),
            "wallet" => Some(AuthMode::Wallet),
            _ => None,
        }
    }
}

/// Typed accessors over a session store.
///
/// Writes are only ever issued by the auth engine's serialized actions, so
/// no locking beyond the store's own is needed.
pub struct SessionVault {
    store: Box<dyn SessionStore>,
}

impl SessionVault {
    /// Create a new vault over the given storage backend.
    pub fn new(store: Box<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Persisted auth mode, if any. An unrecognized stored value reads as
    /// `None` rather than failing (forward/backward compatibility).
    pub fn auth_mode(&self) -> StorageResult<Option<AuthMode>> {
        Ok(self
            .store
            .get(StorageKeys::AUTH_MODE)?
            .as_deref()
            .and_then(AuthMode::parse))
    }

    /// Persist the active auth mode.
    pub fn set_auth_mode(&self, mode: AuthMode) -> StorageResult<()> {
        self.store.set(StorageKeys::AUTH_MODE, mode.as_str())
    }

    /// Remove the persisted auth mode.
    pub fn clear_auth_mode(&self) -> StorageResult<()> {
        self.store.remove(StorageKeys::AUTH_MODE)?;
        Ok(())
    }

    /// Stored username handle, if any.
    pub fn user_name(&self) -> StorageResult<Option<String>> {
        self.store.get(StorageKeys::USER_NAME)
    }

    /// Persist the username handle.
    pub fn set_user_name(&self, user_name: &str) -> StorageResult<()> {
        if user_name.is_empty() {
            return Err(StorageError::Encoding(
                "Username handle must not be empty".to_string(),
            ));
        }
        self.store.set(StorageKeys::USER_NAME, user_name)
    }

    /// Remove the stored username handle.
    pub fn clear_user_name(&self) -> StorageResult<()> {
        self.store.remove(StorageKeys::USER_NAME)?;
        Ok(())
    }

    /// Clear everything the engine persists. Idempotent.
    pub fn clear_all(&self) -> StorageResult<()> {
        self.clear_auth_mode()?;
        self.clear_user_name()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    fn vault() -> SessionVault {
        SessionVault::new(Box::new(MemoryStore::new()))
    }

    #[test]
    fn auth_mode_round_trip() {
        let v = vault();
        assert_eq!(v.auth_mode().unwrap(), None);

        v.set_auth_mode(AuthMode::Wallet).unwrap();
        assert_eq!(v.auth_mode().unwrap(), Some(AuthMode::Wallet));

        v.set_auth_mode(AuthMode::Passkey).unwrap();
        assert_eq!(v.auth_mode().unwrap(), Some(AuthMode::Passkey));

        v.clear_auth_mode().unwrap();
        assert_eq!(v.auth_mode().unwrap(), None);
    }

    #[test]
    fn garbage_auth_mode_reads_as_none() {
        let store = MemoryStore::new();
        store.set(StorageKeys::AUTH_MODE, "telepathy").unwrap();
        let v = SessionVault::new(Box::new(store));
        assert_eq!(v.auth_mode().unwrap(), None);
    }

    #[test]
    fn empty_user_name_rejected() {
        let v = vault();
        assert!(v.set_user_name("").is_err());
    }

    #[test]
    fn clear_all_is_idempotent() {
        let v = vault();
        v.set_user_name("alice").unwrap();
        v.set_auth_mode(AuthMode::Passkey).unwrap();

        v.clear_all().unwrap();
        v.clear_all().unwrap();
        assert_eq!(v.user_name().unwrap(), None);
        assert_eq!(v.auth_mode().unwrap(), None);
    }
}
