//! Storage key constants.

/// Storage keys used by the authentication engine
pub struct StorageKeys;

impl StorageKeys {
    /// Active authentication mode ("passkey" or "wallet")
    pub const AUTH_MODE: &'static str = "auth_mode";

    /// Username handle used to re-fetch passkey credentials
    pub const USER_NAME: &'static str = "user_name";
}
