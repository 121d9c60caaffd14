use std::{collections::HashMap, fs};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: String,
    pub max_body_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8081".into(),
            max_body_bytes: 8 * 1024 * 1024,
        }
    }
}

pub fn load_settings() -> Settings {
    let file = fs::read_to_string("intake.toml").ok();
    settings_from_sources(file.as_deref(), |name| std::env::var(name).ok())
}

pub(crate) fn settings_from_sources(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        match toml::from_str::<HashMap<String, toml::Value>>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("bind_addr").and_then(toml::Value::as_str) {
                    settings.set_bind_addr(v);
                }
                if let Some(v) = file_cfg
                    .get("max_body_bytes")
                    .and_then(toml::Value::as_integer)
                    .and_then(|v| usize::try_from(v).ok())
                {
                    settings.max_body_bytes = v;
                }
            }
            Err(error) => tracing::warn!(%error, "ignoring malformed intake.toml"),
        }
    }

    if let Some(v) = env("INTAKE_BIND") {
        settings.set_bind_addr(&v);
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.set_bind_addr(&v);
    }
    if let Some(v) = env("APP__MAX_BODY_BYTES") {
        match v.parse::<usize>() {
            Ok(parsed) => settings.max_body_bytes = parsed,
            Err(error) => tracing::warn!(value = %v, %error, "ignoring invalid APP__MAX_BODY_BYTES"),
        }
    }

    settings
}

impl Settings {
    fn set_bind_addr(&mut self, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            self.bind_addr = value.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_client_endpoint_port() {
        let settings = settings_from_sources(None, |_| None);
        assert_eq!(settings.bind_addr, "127.0.0.1:8081");
        assert_eq!(settings.max_body_bytes, 8 * 1024 * 1024);
    }

    #[test]
    fn file_then_env_overrides() {
        let raw = "bind_addr = \"0.0.0.0:9000\"\nmax_body_bytes = 1024\n";
        let settings = settings_from_sources(Some(raw), |name| match name {
            "APP__BIND_ADDR" => Some("127.0.0.1:7000".to_string()),
            _ => None,
        });
        assert_eq!(settings.bind_addr, "127.0.0.1:7000");
        assert_eq!(settings.max_body_bytes, 1024);
    }

    #[test]
    fn invalid_values_keep_previous_setting() {
        let settings = settings_from_sources(Some("max_body_bytes = -1"), |name| match name {
            "APP__MAX_BODY_BYTES" => Some("lots".to_string()),
            "INTAKE_BIND" => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(settings, Settings::default());
    }
}
