use crate::services::token_storage::TOKEN_KEY;
use keyring::Entry;
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecureTokenRequest {
    Save(String),
    Get,
    Delete,
}

impl SecureTokenRequest {
    pub fn verb(&self) -> &'static str {
        match self {
            SecureTokenRequest::Save(_) => "save",
            SecureTokenRequest::Get => "get",
            SecureTokenRequest::Delete => "delete",
        }
    }
}

impl fmt::Display for SecureTokenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Credential store owned by the hosting application.
///
/// Only `Get` is expected to return a value; the result of `Save` and
/// `Delete` is ignored by callers.
pub trait SecureTokenHost: Send + Sync {
    fn login_with_secure_token(&self, request: SecureTokenRequest) -> Option<String>;
}

/// Keeps the token in the operating system keychain.
pub struct KeyringSecureHost {
    service_name: String,
}

impl KeyringSecureHost {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    fn entry(&self) -> Result<Entry, keyring::Error> {
        Entry::new(&self.service_name, TOKEN_KEY)
    }
}

impl SecureTokenHost for KeyringSecureHost {
    fn login_with_secure_token(&self, request: SecureTokenRequest) -> Option<String> {
        let verb = request.verb();
        let result = match request {
            SecureTokenRequest::Save(token) => {
                self.entry().and_then(|entry| entry.set_password(&token))
            }
            SecureTokenRequest::Get => {
                return match self.entry().and_then(|entry| entry.get_password()) {
                    Ok(token) => Some(token),
                    Err(keyring::Error::NoEntry) => None,
                    Err(err) => {
                        warn!(service = %self.service_name, error = %err, "keychain read failed");
                        None
                    }
                };
            }
            SecureTokenRequest::Delete => match self.entry().and_then(|entry| entry.delete_password()) {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(err) => Err(err),
            },
        };

        if let Err(err) = result {
            warn!(service = %self.service_name, verb, error = %err, "keychain request failed");
        }
        None
    }
}
