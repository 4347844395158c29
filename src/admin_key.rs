//! OpenAI Admin API key, read from the process environment.
//!
//! In CI the key arrives as a repository secret; locally it can come from a
//! `.env` file loaded by the binary before this module runs.
//!
//! Never log the key value. Use [`AdminKey::masked`] for diagnostics.

use std::fmt;

use crate::error::PollerError;

/// Default environment variable holding the admin key.
pub const DEFAULT_ADMIN_KEY_ENV: &str = "OPENAI_ADMIN_API_KEY";

/// Placeholder value shipped in sample `.env` files; treated as unset.
const PLACEHOLDER_KEY: &str = "your_openai_admin_key_here";

/// An OpenAI Admin API key with usage read permission.
#[derive(Clone)]
pub struct AdminKey(String);

impl AdminKey {
    /// Wrap a raw key value. Returns None for empty or placeholder values.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let key = raw.into().trim().to_string();
        if key.is_empty() || key == PLACEHOLDER_KEY {
            None
        } else {
            Some(Self(key))
        }
    }

    /// Read the key from `var`.
    pub fn from_env(var: &str) -> Result<Self, PollerError> {
        let raw = match std::env::var(var) {
            Ok(v) => v,
            Err(std::env::VarError::NotPresent) => {
                return Err(PollerError::MissingApiKey(var.to_string()))
            }
            Err(std::env::VarError::NotUnicode(_)) => {
                return Err(PollerError::Config(format!("{} is not valid UTF-8", var)))
            }
        };

        Self::new(raw).ok_or_else(|| PollerError::MissingApiKey(var.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Masked version of the key for display (e.g., "sk-...abc123")
    pub fn masked(&self) -> String {
        let key = &self.0;
        if key.len() <= 8 || !key.is_ascii() {
            "*".repeat(key.chars().count())
        } else {
            format!("{}...{}", &key[..3], &key[key.len() - 6..])
        }
    }
}

impl fmt::Debug for AdminKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AdminKey").field(&self.masked()).finish()
    }
}
