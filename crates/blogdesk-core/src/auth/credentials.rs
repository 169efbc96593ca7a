use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::CredentialBackend;
use crate::models::UserProfile;

use super::SessionData;

const SERVICE_NAME: &str = "blogdesk";

/// Credential file name in the data directory
const CREDENTIALS_FILE: &str = "credentials.json";

/// Key holding the bearer token
pub const TOKEN_KEY: &str = "token";

/// Key holding the JSON-serialized `UserProfile`
pub const USER_KEY: &str = "user";

/// Durable string map the session is persisted into.
///
/// Removing a key that does not exist is not an error.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Build the store selected in the config.
pub fn open_store(backend: CredentialBackend, data_dir: &Path) -> Result<Box<dyn CredentialStore>> {
    debug!(?backend, "Opening credential store");
    Ok(match backend {
        CredentialBackend::Keyring => Box::new(KeyringStore::new()),
        CredentialBackend::File => Box::new(FileStore::new(data_dir.join(CREDENTIALS_FILE))),
        CredentialBackend::Memory => Box::new(MemoryStore::new()),
    })
}

// ============================================================================
// Record helpers
// ============================================================================

/// Read the persisted session, if a complete one exists.
///
/// Missing keys, a partial record, an empty token or an unreadable profile
/// all yield `None`; this never fails.
pub fn load_record(store: &dyn CredentialStore) -> Option<SessionData> {
    let token = match store.get(TOKEN_KEY) {
        Ok(token) => token,
        Err(e) => {
            warn!(error = %e, "Failed to read stored token");
            return None;
        }
    };
    let user = match store.get(USER_KEY) {
        Ok(user) => user,
        Err(e) => {
            warn!(error = %e, "Failed to read stored user profile");
            return None;
        }
    };

    match (token, user) {
        (None, None) => None,
        (Some(token), Some(raw_user)) if !token.is_empty() => {
            match serde_json::from_str::<UserProfile>(&raw_user) {
                Ok(user) => Some(SessionData { token, user }),
                Err(e) => {
                    warn!(error = %e, "Stored user profile is malformed, ignoring session");
                    None
                }
            }
        }
        (token, user) => {
            warn!(
                has_token = token.is_some(),
                has_user = user.is_some(),
                "Incomplete stored session, ignoring"
            );
            None
        }
    }
}

/// Persist token and profile as two key writes.
///
/// If the profile write fails the token is put back to its previous value, so
/// the store keeps whatever complete record (or nothing) it held before.
pub fn save_record(store: &dyn CredentialStore, data: &SessionData) -> Result<()> {
    let user = serde_json::to_string(&data.user).context("Failed to serialize user profile")?;
    let prior_token = store.get(TOKEN_KEY).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to read stored token before overwrite");
        None
    });

    store.set(TOKEN_KEY, &data.token)?;
    if let Err(e) = store.set(USER_KEY, &user) {
        let rollback = match prior_token {
            Some(ref token) => store.set(TOKEN_KEY, token),
            None => store.remove(TOKEN_KEY),
        };
        if let Err(rollback) = rollback {
            warn!(error = %rollback, "Failed to roll back stored token");
        }
        return Err(e);
    }
    Ok(())
}

/// Remove both keys. Both removals are attempted; the first error is returned.
pub fn clear_record(store: &dyn CredentialStore) -> Result<()> {
    let token = store.remove(TOKEN_KEY);
    let user = store.remove(USER_KEY);
    token.and(user)
}

// ============================================================================
// Keyring
// ============================================================================

/// OS keychain store: one entry per key under the `blogdesk` service.
#[derive(Debug, Default)]
pub struct KeyringStore;

impl KeyringStore {
    pub fn new() -> Self {
        Self
    }

    fn entry(key: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, key).context("Failed to create keyring entry")
    }
}

impl CredentialStore for KeyringStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match Self::entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve credential from keychain"),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        Self::entry(key)?
            .set_password(value)
            .context("Failed to store credential in keychain")
    }

    fn remove(&self, key: &str) -> Result<()> {
        match Self::entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete credential from keychain"),
        }
    }
}

// ============================================================================
// File
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialFile {
    #[serde(default)]
    entries: BTreeMap<String, String>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

/// JSON file store. Each write rewrites the whole document through a
/// temporary file and a rename.
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<CredentialFile> {
        if !self.path.exists() {
            return Ok(CredentialFile::default());
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read credential file: {}", self.path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse credential file: {}", self.path.display()))
    }

    fn write(&self, file: &CredentialFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(file)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)
            .with_context(|| format!("Failed to write credential file: {}", tmp.display()))?;
        restrict_permissions(&tmp)?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace credential file: {}", self.path.display()))?;
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut BTreeMap<String, String>) -> bool) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = self.read()?;
        if apply(&mut file.entries) {
            file.updated_at = Some(Utc::now());
            self.write(&file)?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

impl CredentialStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read()?.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        self.update(|entries| entries.remove(key).is_some())
    }
}

// ============================================================================
// Memory
// ============================================================================

/// In-process store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).is_empty()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}
