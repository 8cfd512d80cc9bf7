use std::{collections::HashMap, fs, path::Path};

use anyhow::Context;
use serde::Deserialize;
use url::Url;

use crate::cookies::CSRF_COOKIE_NAME;

pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const DEFAULT_CONFIG_FILE: &str = "client.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct ClientSettings {
    pub base_url: String,
    pub csrf_cookie_name: String,
    pub csrf_header: String,
    pub session_file: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".into(),
            csrf_cookie_name: CSRF_COOKIE_NAME.into(),
            csrf_header: CSRF_HEADER.into(),
            session_file: "./data/session.json".into(),
        }
    }
}

impl ClientSettings {
    /// Base URL without query, fragment or trailing slash, so API paths can
    /// be appended.
    pub fn api_root(&self) -> anyhow::Result<String> {
        let mut parsed = Url::parse(self.base_url.trim())
            .with_context(|| format!("invalid base url: {}", self.base_url))?;
        if parsed.cannot_be_a_base() {
            anyhow::bail!("base url cannot carry paths: {}", self.base_url);
        }
        parsed.set_query(None);
        parsed.set_fragment(None);
        Ok(parsed.as_str().trim_end_matches('/').to_string())
    }
}

/// Defaults, then `path` (or `client.toml`) if it exists, then environment.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    let explicit = path.is_some();
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg = toml::from_str::<HashMap<String, String>>(&raw)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            apply_overrides(&mut settings, |key| file_cfg.get(key).cloned());
        }
        Err(err) if !explicit && err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    }

    apply_overrides(&mut settings, |key| {
        std::env::var(format!("APP__{}", key.to_ascii_uppercase())).ok()
    });

    settings.api_root()?;
    Ok(settings)
}

fn apply_overrides(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("base_url") {
        settings.base_url = v;
    }
    if let Some(v) = lookup("csrf_cookie_name") {
        settings.csrf_cookie_name = v;
    }
    if let Some(v) = lookup("csrf_header") {
        settings.csrf_header = v;
    }
    if let Some(v) = lookup("session_file") {
        settings.session_file = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
