//! Session storage for the GreenGoods client.
//!
//! This crate persists the small amount of state that must survive a reload:
//! the active authentication mode and the username handle used to re-fetch
//! passkey credentials from the backend. Credential material itself is never
//! persisted client-side; compromise of this store cannot leak a usable
//! credential.

mod file;
mod keys;
mod memory;
mod traits;
mod vault;

pub use file::FileStore;
pub use keys::StorageKeys;
pub use memory::MemoryStore;
pub use traits::SessionStore;
pub use vault::{AuthMode, SessionVault};

use thiserror::Error;

/// Application directory name under the platform data dir.
pub const APP_DIR_NAME: &str = "greengoods";

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend-specific storage error
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Data directory could not be resolved
    #[error("Path error: {0}")]
    Path(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Create the default persistent store in the platform data directory.
pub fn create_store() -> StorageResult<Box<dyn SessionStore>> {
    let base = dirs::data_dir()
        .ok_or_else(|| StorageError::Path("Platform data directory not found".to_string()))?;
    let store = FileStore::new(base.join(APP_DIR_NAME).join("session.json"))?;
    Ok(Box::new(store))
}

/// Create a SessionVault backed by the default persistent store.
pub fn create_session_vault() -> StorageResult<SessionVault> {
    let store = create_store()?;
    Ok(SessionVault::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_get_delete() {
        let store = MemoryStore::new();

        store.set("test_key", "test_value").unwrap();
        assert_eq!(
            store.get("test_key").unwrap(),
            Some("test_value".to_string())
        );

        assert!(store.has("test_key").unwrap());
        assert!(!store.has("nonexistent").unwrap());

        assert!(store.remove("test_key").unwrap());
        assert!(!store.remove("test_key").unwrap());
        assert_eq!(store.get("test_key").unwrap(), None);
    }

    #[test]
    fn vault_round_trip() {
        let vault = SessionVault::new(Box::new(MemoryStore::new()));

        vault.set_user_name("alice").unwrap();
        assert_eq!(vault.user_name().unwrap(), Some("alice".to_string()));

        vault.set_auth_mode(AuthMode::Passkey).unwrap();
        assert_eq!(vault.auth_mode().unwrap(), Some(AuthMode::Passkey));

        vault.clear_all().unwrap();
        assert_eq!(vault.user_name().unwrap(), None);
        assert_eq!(vault.auth_mode().unwrap(), None);
    }

    #[test]
    fn storage_keys_are_unique() {
        let keys = [StorageKeys::AUTH_MODE, StorageKeys::USER_NAME];
        let unique: std::collections::HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len(), "Storage keys must be unique");
    }
}
