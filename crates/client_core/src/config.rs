use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8081/api/messages";
pub const DEFAULT_CONFIG_FILE: &str = "contact.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub endpoint: String,
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            request_timeout_secs: None,
        }
    }
}

impl ClientSettings {
    pub fn endpoint_url(&self) -> anyhow::Result<Url> {
        let url = Url::parse(self.endpoint.trim())
            .with_context(|| format!("invalid contact endpoint '{}'", self.endpoint))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!(
                "contact endpoint '{}' must use http or https, got '{}'",
                self.endpoint,
                url.scheme()
            );
        }
        Ok(url)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    endpoint: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then `contact.toml` (or `config_path`), then environment overrides.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<ClientSettings> {
    let explicit = config_path.is_some();
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let raw = match fs::read_to_string(&path) {
        Ok(raw) => Some(raw),
        Err(err) if !explicit && err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    };

    settings_from_sources(raw.as_deref(), |name| std::env::var(name).ok())
        .with_context(|| format!("failed to load client settings from '{}'", path.display()))
}

pub(crate) fn settings_from_sources(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    if let Some(raw) = file {
        let file_cfg: FileSettings = toml::from_str(raw).context("malformed TOML settings")?;
        if let Some(v) = file_cfg.endpoint {
            settings.endpoint = v;
        }
        if file_cfg.request_timeout_secs.is_some() {
            settings.request_timeout_secs = file_cfg.request_timeout_secs;
        }
    }

    if let Some(v) = read_non_empty(&env, "CONTACT_ENDPOINT") {
        settings.endpoint = v;
    }
    if let Some(v) = read_non_empty(&env, "APP__ENDPOINT") {
        settings.endpoint = v;
    }
    if let Some(v) = read_non_empty(&env, "APP__REQUEST_TIMEOUT_SECS") {
        let secs = v
            .parse::<u64>()
            .with_context(|| format!("APP__REQUEST_TIMEOUT_SECS must be an integer, got '{v}'"))?;
        settings.request_timeout_secs = Some(secs);
    }

    settings.endpoint_url()?;
    Ok(settings)
}

fn read_non_empty(env: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    env(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
