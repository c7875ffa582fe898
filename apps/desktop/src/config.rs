use std::{fs, io, path::Path, time::Duration};

use anyhow::{Context, Result};
use client_core::ServiceEndpoints;
use serde::Deserialize;

pub const SETTINGS_FILE: &str = "dashboard.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub expense_api_url: String,
    pub chat_api_url: String,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            expense_api_url: "http://127.0.0.1:8000".into(),
            chat_api_url: "http://127.0.0.1:8000".into(),
            request_timeout_secs: 15,
        }
    }
}

impl Settings {
    pub fn endpoints(&self) -> Result<ServiceEndpoints> {
        let endpoints = ServiceEndpoints::new(&self.expense_api_url, &self.chat_api_url)
            .context("invalid service url in dashboard settings")?;
        let timeout = Duration::from_secs(self.request_timeout_secs.max(1));
        Ok(endpoints.with_request_timeout(timeout))
    }
}

pub fn load_settings() -> Result<Settings> {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the settings file if present, then environment overrides.
pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings> {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str::<Settings>(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => Settings::default(),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()));
        }
    };

    for key in ["EXPENSE_API_URL", "APP__EXPENSE_API_URL"] {
        if let Some(v) = env(key) {
            settings.expense_api_url = v;
        }
    }
    for key in ["CHAT_API_URL", "APP__CHAT_API_URL"] {
        if let Some(v) = env(key) {
            settings.chat_api_url = v;
        }
    }
    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    Ok(settings)
}
