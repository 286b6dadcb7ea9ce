//! Embedded authentication provider
//!
//! Keeps accounts and the active provider session in the local key-value
//! store so the command-line harness can sign in without a hosted service.
//! Passwords are stored as salted blake3 digests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ClioError, ClioResult};
use crate::session::AuthProvider;
use crate::storage::KeyValueStore;
use crate::types::UserId;

const ACCOUNTS_KEY: &str = "auth/accounts";
const ACTIVE_SESSION_KEY: &str = "auth/session";
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AccountRecord {
    uid: UserId,
    /// Hex-encoded 16-byte salt
    salt: String,
    /// Hex-encoded blake3(salt || password)
    digest: String,
}

/// Authentication provider persisted in a [`KeyValueStore`]
pub struct LocalAuth {
    kv: Arc<dyn KeyValueStore>,
}

impl LocalAuth {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    fn load_accounts(&self) -> ClioResult<HashMap<String, AccountRecord>> {
        match self.kv.get(ACCOUNTS_KEY)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| ClioError::DecodeFailure(format!("{}: {}", ACCOUNTS_KEY, e))),
            None => Ok(HashMap::new()),
        }
    }

    fn save_accounts(&self, accounts: &HashMap<String, AccountRecord>) -> ClioResult<()> {
        let bytes =
            serde_json::to_vec(accounts).map_err(|e| ClioError::Serialization(e.to_string()))?;
        self.kv.set(ACCOUNTS_KEY, &bytes)
    }

    fn activate(&self, uid: &UserId) -> ClioResult<()> {
        self.kv.set(ACTIVE_SESSION_KEY, uid.as_str().as_bytes())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn digest(salt: &[u8], password: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_hex().to_string()
}

fn validate(email: &str, password: &str) -> ClioResult<()> {
    if email.is_empty() || !email.contains('@') {
        return Err(ClioError::Auth("a valid email is required".into()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ClioError::Auth(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

#[async_trait]
impl AuthProvider for LocalAuth {
    async fn create_account(&self, email: &str, password: &str) -> ClioResult<UserId> {
        let email = normalize_email(email);
        validate(&email, password)?;

        let mut accounts = self.load_accounts()?;
        if accounts.contains_key(&email) {
            return Err(ClioError::Auth("an account with this email already exists".into()));
        }

        let mut salt = [0u8; 16];
        rand::rng().fill_bytes(&mut salt);
        let uid = UserId::generate();
        accounts.insert(
            email.clone(),
            AccountRecord {
                uid: uid.clone(),
                salt: hex::encode(salt),
                digest: digest(&salt, password),
            },
        );
        self.save_accounts(&accounts)?;
        self.activate(&uid)?;

        info!(%uid, "Created account");
        Ok(uid)
    }

    async fn sign_in(&self, email: &str, password: &str) -> ClioResult<UserId> {
        let email = normalize_email(email);
        let accounts = self.load_accounts()?;
        let invalid = || ClioError::Auth("invalid email or password".into());

        let record = accounts.get(&email).ok_or_else(invalid)?;
        let salt = hex::decode(&record.salt)
            .map_err(|e| ClioError::DecodeFailure(format!("account salt: {}", e)))?;
        if digest(&salt, password) != record.digest {
            debug!("Password mismatch");
            return Err(invalid());
        }

        self.activate(&record.uid)?;
        info!(uid = %record.uid, "Signed in");
        Ok(record.uid.clone())
    }

    async fn sign_out(&self) -> ClioResult<()> {
        self.kv.remove(ACTIVE_SESSION_KEY)
    }

    async fn current_user_id(&self) -> Option<UserId> {
        match self.kv.get(ACTIVE_SESSION_KEY) {
            Ok(Some(bytes)) => String::from_utf8(bytes).ok().map(UserId::from),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKv;

    fn auth() -> LocalAuth {
        LocalAuth::new(Arc::new(MemoryKv::new()))
    }

    #[tokio::test]
    async fn test_create_then_sign_in() {
        let auth = auth();
        let uid = auth.create_account("Reader@Example.com ", "secret1").await.unwrap();
        assert_eq!(auth.current_user_id().await, Some(uid.clone()));

        auth.sign_out().await.unwrap();
        assert_eq!(auth.current_user_id().await, None);

        let again = auth.sign_in("reader@example.com", "secret1").await.unwrap();
        assert_eq!(again, uid);
        assert_eq!(auth.current_user_id().await, Some(uid));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_the_same() {
        let auth = auth();
        auth.create_account("reader@example.com", "secret1").await.unwrap();
        auth.sign_out().await.unwrap();

        let wrong = auth.sign_in("reader@example.com", "nope123").await.unwrap_err();
        let unknown = auth.sign_in("nobody@example.com", "secret1").await.unwrap_err();
        assert_eq!(wrong.to_string(), unknown.to_string());
        assert_eq!(auth.current_user_id().await, None);
    }

    #[tokio::test]
    async fn test_duplicate_and_weak_credentials_rejected() {
        let auth = auth();
        auth.create_account("reader@example.com", "secret1").await.unwrap();
        assert!(matches!(
            auth.create_account("reader@example.com", "secret2").await,
            Err(ClioError::Auth(_))
        ));
        assert!(matches!(
            auth.create_account("other@example.com", "123").await,
            Err(ClioError::Auth(_))
        ));
        assert!(matches!(
            auth.create_account("not-an-email", "secret1").await,
            Err(ClioError::Auth(_))
        ));
    }
}
