//! Runtime configuration for a Clio instance

use std::path::PathBuf;

/// Default host of the outbound share links
pub const DEFAULT_APP_DOMAIN: &str = "clioapp-1dc1f-flowlinks-v2.web.app";

/// Fixed local-cache key holding the guest's saved books
pub const DEFAULT_GUEST_CACHE_KEY: &str = "guest_saved_books_v1";

/// Configuration shared by every component of an engine instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClioConfig {
    /// Directory holding the local database files
    pub data_dir: PathBuf,
    /// Host used when building share links
    pub app_domain: String,
    /// Local-cache key for guest saved books
    pub guest_cache_key: String,
    /// Length of generated share tokens
    pub share_token_len: usize,
    /// How many fresh tokens to try before giving up on a collision
    pub share_token_attempts: usize,
}

impl Default for ClioConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".clio").join("data"),
            app_domain: DEFAULT_APP_DOMAIN.to_string(),
            guest_cache_key: DEFAULT_GUEST_CACHE_KEY.to_string(),
            share_token_len: 10,
            share_token_attempts: 3,
        }
    }
}

impl ClioConfig {
    /// Default configuration rooted at `data_dir`
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn app_domain(mut self, app_domain: impl Into<String>) -> Self {
        self.app_domain = app_domain.into();
        self
    }

    /// Path of the local key-value database
    pub fn local_db_path(&self) -> PathBuf {
        self.data_dir.join("clio.redb")
    }

    /// Path of the embedded document store standing in for the remote backend
    pub fn remote_db_path(&self) -> PathBuf {
        self.data_dir.join("remote.redb")
    }
}
