use std::{fs, path::Path, str::FromStr, time::Duration};

use anyhow::{bail, Context};
use clap::ValueEnum;
use serde::Deserialize;
use url::Url;

use donation_core::submission::DEFAULT_SUBMIT_ENDPOINT;

pub const DEFAULT_CONFIG_FILE: &str = "donation.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SubmitMode {
    /// POST the payload to the configured endpoint.
    Remote,
    /// Accept submissions without network I/O.
    Local,
}

impl FromStr for SubmitMode {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "remote" | "http" => Ok(SubmitMode::Remote),
            "local" | "noop" => Ok(SubmitMode::Local),
            other => bail!("unknown submit mode '{other}' (expected 'remote' or 'local')"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub submit_endpoint: String,
    pub submit_mode: SubmitMode,
    pub auto_advance_delay_ms: u64,
    pub session_ttl_seconds: i64,
    pub submit_timeout_seconds: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            submit_endpoint: DEFAULT_SUBMIT_ENDPOINT.into(),
            submit_mode: SubmitMode::Remote,
            auto_advance_delay_ms: 500,
            session_ttl_seconds: 3600,
            submit_timeout_seconds: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    submit_endpoint: Option<String>,
    submit_mode: Option<SubmitMode>,
    auto_advance_delay_ms: Option<u64>,
    session_ttl_seconds: Option<i64>,
    submit_timeout_seconds: Option<u64>,
}

impl Settings {
    pub fn endpoint_url(&self) -> anyhow::Result<Url> {
        let url = Url::parse(&self.submit_endpoint)
            .with_context(|| format!("invalid submit endpoint '{}'", self.submit_endpoint))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("submit endpoint must use http or https, got '{}'", url.scheme());
        }
        Ok(url)
    }

    pub fn auto_advance_delay(&self) -> Duration {
        Duration::from_millis(self.auto_advance_delay_ms)
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.session_ttl_seconds)
    }

    pub fn submit_timeout(&self) -> Option<Duration> {
        self.submit_timeout_seconds.map(Duration::from_secs)
    }

    fn apply_file(&mut self, raw: &str) -> anyhow::Result<()> {
        let file_cfg: FileSettings = toml::from_str(raw).context("failed to parse settings file")?;
        if let Some(v) = file_cfg.submit_endpoint {
            self.submit_endpoint = v;
        }
        if let Some(v) = file_cfg.submit_mode {
            self.submit_mode = v;
        }
        if let Some(v) = file_cfg.auto_advance_delay_ms {
            self.auto_advance_delay_ms = v;
        }
        if let Some(v) = file_cfg.session_ttl_seconds {
            self.session_ttl_seconds = v;
        }
        if file_cfg.submit_timeout_seconds.is_some() {
            self.submit_timeout_seconds = file_cfg.submit_timeout_seconds;
        }
        Ok(())
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(v) = lookup("SUBMIT_ENDPOINT") {
            self.submit_endpoint = v;
        }
        if let Some(v) = lookup("APP__SUBMIT_ENDPOINT") {
            self.submit_endpoint = v;
        }

        if let Some(v) = lookup("APP__SUBMIT_MODE") {
            self.submit_mode = v.parse()?;
        }

        if let Some(v) = lookup("APP__AUTO_ADVANCE_DELAY_MS") {
            if let Ok(parsed) = v.parse::<u64>() {
                self.auto_advance_delay_ms = parsed;
            }
        }
        if let Some(v) = lookup("APP__SESSION_TTL_SECONDS") {
            if let Ok(parsed) = v.parse::<i64>() {
                self.session_ttl_seconds = parsed;
            }
        }
        if let Some(v) = lookup("APP__SUBMIT_TIMEOUT_SECONDS") {
            if let Ok(parsed) = v.parse::<u64>() {
                self.submit_timeout_seconds = Some(parsed);
            }
        }
        Ok(())
    }
}

/// Defaults, then the settings file if present, then environment overrides.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(path) {
        Ok(raw) => settings
            .apply_file(&raw)
            .with_context(|| format!("in '{}'", path.display()))?,
        Err(err) if config_path.is_some() => {
            return Err(err).with_context(|| format!("failed to read '{}'", path.display()));
        }
        Err(_) => {}
    }

    settings.apply_env(|key| std::env::var(key).ok())?;
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
