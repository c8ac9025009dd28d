use crate::services::local_store::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
use crate::services::secure_host::{KeyringSecureHost, SecureTokenHost, SecureTokenRequest};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Key under which the session token is stored, both locally and in the keychain.
pub const TOKEN_KEY: &str = "ec_token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Local,
    Secure,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Local => write!(f, "local storage"),
            StorageKind::Secure => write!(f, "secure storage"),
        }
    }
}

/// Save, read and forget the session token.
///
/// None of the operations fail: an unavailable backend or a missing value
/// reads as `None` and writes become no-ops.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    fn kind(&self) -> StorageKind;
    async fn save_token(&self, token: &str);
    async fn get_token(&self) -> Option<String>;
    async fn delete_token(&self);
}

pub struct LocalTokenStorage {
    backend: Option<Arc<dyn KeyValueStore>>,
}

impl LocalTokenStorage {
    pub fn new(backend: Option<Arc<dyn KeyValueStore>>) -> Self {
        Self { backend }
    }

    #[cfg(test)]
    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }
}

#[async_trait]
impl TokenStorage for LocalTokenStorage {
    fn kind(&self) -> StorageKind {
        StorageKind::Local
    }

    async fn save_token(&self, token: &str) {
        let Some(backend) = &self.backend else {
            debug!("no local storage backend; token not saved");
            return;
        };
        if let Err(err) = backend.set(TOKEN_KEY, token) {
            warn!(error = %err, "failed to save token to local storage");
        }
    }

    async fn get_token(&self) -> Option<String> {
        let backend = self.backend.as_ref()?;
        match backend.get(TOKEN_KEY) {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "failed to read token from local storage");
                None
            }
        }
    }

    async fn delete_token(&self) {
        let Some(backend) = &self.backend else {
            return;
        };
        if let Err(err) = backend.remove(TOKEN_KEY) {
            warn!(error = %err, "failed to delete token from local storage");
        }
    }
}

pub struct SecureTokenStorage {
    host: Arc<dyn SecureTokenHost>,
}

impl SecureTokenStorage {
    pub fn new(host: Arc<dyn SecureTokenHost>) -> Self {
        Self { host }
    }
}

#[async_trait]
impl TokenStorage for SecureTokenStorage {
    fn kind(&self) -> StorageKind {
        StorageKind::Secure
    }

    async fn save_token(&self, token: &str) {
        self.host
            .login_with_secure_token(SecureTokenRequest::Save(token.to_owned()));
    }

    async fn get_token(&self) -> Option<String> {
        self.host
            .login_with_secure_token(SecureTokenRequest::Get)
            .filter(|token| !token.is_empty())
    }

    async fn delete_token(&self) {
        self.host.login_with_secure_token(SecureTokenRequest::Delete);
    }
}

/// Everything a storage variant may need, resolved once at startup.
#[derive(Clone)]
pub struct StorageBackends {
    pub local: Option<Arc<dyn KeyValueStore>>,
    pub secure_host: Arc<dyn SecureTokenHost>,
}

impl StorageBackends {
    pub fn new(
        local: Option<Arc<dyn KeyValueStore>>,
        secure_host: Arc<dyn SecureTokenHost>,
    ) -> Self {
        Self { local, secure_host }
    }

    pub fn detect(keyring_service: &str, ephemeral: bool) -> Self {
        let local: Option<Arc<dyn KeyValueStore>> = if ephemeral {
            Some(Arc::new(MemoryKeyValueStore::default()))
        } else {
            FileKeyValueStore::probe().map(|store| Arc::new(store) as Arc<dyn KeyValueStore>)
        };
        let secure_host: Arc<dyn SecureTokenHost> =
            Arc::new(KeyringSecureHost::new(keyring_service));
        Self::new(local, secure_host)
    }
}

pub fn select_token_storage(secure: bool, backends: &StorageBackends) -> Box<dyn TokenStorage> {
    if secure {
        Box::new(SecureTokenStorage::new(backends.secure_host.clone()))
    } else {
        Box::new(LocalTokenStorage::new(backends.local.clone()))
    }
}

/// Short description of a token that is safe to show on screen.
pub fn redact_token(token: &str) -> String {
    let visible: String = token.chars().take(4).collect();
    if token.chars().count() <= 4 {
        "••••".to_string()
    } else {
        format!("{visible}•••• ({} chars)", token.chars().count())
    }
}
