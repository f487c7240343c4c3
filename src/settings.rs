use anyhow::{Context, Result, anyhow};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
// rand_core 0.6 is what password-hash/argon2 depends on; must match that version.
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

/// Minimum accepted admin password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// The singleton admin configuration record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "passwordHash")]
    pub password_hash: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password must be at least {MIN_PASSWORD_LEN} characters long.")]
    TooShort,
    #[error("Cannot store password: {0}")]
    Io(#[from] io::Error),
    #[error("Password hashing failed: {0}")]
    Hash(String),
}

/// Admin configuration persisted as a single JSON object on disk.
#[derive(Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(data_root: &Path) -> Self {
        Self {
            path: data_root.join("config.json"),
        }
    }

    /// Read the config record; `None` if the file is absent or unparsable.
    pub async fn load(&self) -> Option<Settings> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!("Cannot read {}: {}", self.path.display(), e);
                }
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unparsable config file {}: {}",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    /// First-run initialization: write the config file from the operator's
    /// initial password if no config exists yet.
    ///
    /// The initial password is deliberately not baked into the binary; it
    /// must arrive out-of-band (ADMIN_PASSWORD). Returns `true` when a new
    /// config file was written.
    pub async fn seed_if_missing(&self, initial_password: Option<&str>) -> Result<bool> {
        if self.load().await.is_some() {
            return Ok(false);
        }

        let password = initial_password.ok_or_else(|| {
            anyhow!(
                "no admin config at {}; set ADMIN_PASSWORD to bootstrap one",
                self.path.display()
            )
        })?;
        if password.len() < MIN_PASSWORD_LEN {
            return Err(anyhow!(
                "initial admin password must be at least {MIN_PASSWORD_LEN} characters"
            ));
        }

        let hash = hash_password(password)?;
        self.persist(&Settings {
            password_hash: hash,
        })
        .await
        .with_context(|| format!("Cannot write {}", self.path.display()))?;
        Ok(true)
    }

    /// Replace the stored password hash wholesale.
    ///
    /// No current-password check: reaching this requires an authenticated
    /// admin session, and there is only one admin identity.
    pub async fn set_password(&self, new_password: &str) -> Result<(), PasswordError> {
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(PasswordError::TooShort);
        }

        let hash = hash_password(new_password).map_err(|e| PasswordError::Hash(e.to_string()))?;
        self.persist(&Settings {
            password_hash: hash,
        })
        .await?;
        Ok(())
    }

    /// Verify a login attempt against the stored hash.
    /// Returns `false` on any error, missing config included.
    pub async fn verify(&self, password: &str) -> bool {
        let Some(settings) = self.load().await else {
            return false;
        };

        let parsed = match PasswordHash::new(&settings.password_hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    async fn persist(&self, settings: &Settings) -> io::Result<()> {
        let json = serde_json::to_string_pretty(settings).map_err(io::Error::other)?;
        tokio::fs::write(&self.path, json).await
    }
}

/// Hash a password with argon2id and return the PHC string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}
