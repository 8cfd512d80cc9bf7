use std::{
    collections::BTreeMap,
    fs,
    path::PathBuf,
    sync::Mutex,
};

use anyhow::{anyhow, Context, Result};
use tracing::warn;

use crate::cookies::get_cookie;

pub const ACCESS_TOKEN_KEY: &str = "access";
pub const REFRESH_TOKEN_KEY: &str = "refresh";

/// Ambient browser state the actions read from: the cookie string and a
/// key/value persistent store holding the session tokens.
pub trait CredentialStore: Send + Sync {
    fn cookie_string(&self) -> Option<String>;
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;

    fn read_cookie(&self, name: &str) -> Option<String> {
        self.cookie_string()
            .and_then(|cookies| get_cookie(&cookies, name))
    }

    /// Unreadable storage is treated as an absent token.
    fn read_token(&self, key: &str) -> Option<String> {
        match self.get_item(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "failed to read token from storage");
                None
            }
        }
    }

    fn store_session_tokens(&self, access: &str, refresh: &str) -> Result<()> {
        self.set_item(ACCESS_TOKEN_KEY, access)?;
        self.set_item(REFRESH_TOKEN_KEY, refresh)
    }

    /// Removes both session tokens. A failure on one key does not stop the
    /// other from being removed.
    fn clear_session_tokens(&self) {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(err) = self.remove_item(key) {
                warn!(key, error = %err, "failed to remove session token");
            }
        }
    }
}

#[derive(Default)]
pub struct MemoryCredentials {
    cookies: Mutex<Option<String>>,
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cookies(cookies: impl Into<String>) -> Self {
        Self {
            cookies: Mutex::new(Some(cookies.into())),
            items: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn set_cookies(&self, cookies: Option<String>) {
        if let Ok(mut guard) = self.cookies.lock() {
            *guard = cookies;
        }
    }
}

impl CredentialStore for MemoryCredentials {
    fn cookie_string(&self) -> Option<String> {
        self.cookies.lock().ok().and_then(|guard| guard.clone())
    }

    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self
            .items
            .lock()
            .map_err(|_| anyhow!("credential store lock poisoned"))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| anyhow!("credential store lock poisoned"))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| anyhow!("credential store lock poisoned"))?;
        items.remove(key);
        Ok(())
    }
}

/// Token storage persisted as a flat JSON object on disk, with the cookie
/// string fixed at construction.
pub struct FileCredentials {
    path: PathBuf,
    cookies: Option<String>,
    lock: Mutex<()>,
}

impl FileCredentials {
    pub fn new(path: impl Into<PathBuf>, cookies: Option<String>) -> Self {
        Self {
            path: path.into(),
            cookies,
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new())
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read {}", self.path.display()))
            }
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {}", self.path.display()))
    }

    fn save(&self, items: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(items)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }

    fn update(&self, apply: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow!("credential file lock poisoned"))?;
        let mut items = self.load()?;
        apply(&mut items);
        self.save(&items)
    }
}

impl CredentialStore for FileCredentials {
    fn cookie_string(&self) -> Option<String> {
        self.cookies.clone()
    }

    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow!("credential file lock poisoned"))?;
        Ok(self.load()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.update(|items| {
            items.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.update(|items| {
            items.remove(key);
        })
    }
}

#[cfg(test)]
#[path = "tests/credentials_tests.rs"]
mod tests;
