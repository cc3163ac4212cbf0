use anyhow::{Result, anyhow};
use chrono::{FixedOffset, TimeDelta, Utc};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub http: Http,
    pub log: Log,
    pub session: Session,
    pub store: Store,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Deserialize)]
pub struct Session {
    pub ttl_secs: u64,
    /// Offset used to render `Refresh-Expires`; process local time when unset.
    #[serde(default)]
    pub utc_offset_secs: Option<i32>,
}

impl Session {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn utc_offset(&self) -> Result<Option<FixedOffset>> {
        self.utc_offset_secs
            .map(|secs| {
                FixedOffset::east_opt(secs)
                    .ok_or_else(|| anyhow!("session.utc_offset_secs out of range: {}", secs))
            })
            .transpose()
    }
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: String, // "memory" or "redis"
    #[serde(default)]
    pub redis_url: Option<String>,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Store {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_prefix() -> String {
    "session".to_string()
}

fn default_timeout_ms() -> u64 {
    2000
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

/// Loads settings from `path` (or the build's default file), then applies
/// `SESAME__SECTION__KEY` environment overrides.
pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .add_source(
            Environment::with_prefix("SESAME")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    settings.validate()?;
    Ok(settings)
}

impl Settings {
    fn validate(&self) -> Result<()> {
        if self.session.ttl_secs == 0 {
            return Err(anyhow!("session.ttl_secs must be positive"));
        }
        let representable = TimeDelta::from_std(self.session.ttl())
            .ok()
            .and_then(|delta| Utc::now().checked_add_signed(delta))
            .is_some()
            && std::time::Instant::now()
                .checked_add(self.session.ttl())
                .is_some();
        if !representable {
            return Err(anyhow!(
                "session.ttl_secs too large: {}",
                self.session.ttl_secs
            ));
        }
        if self.store.timeout_ms == 0 {
            return Err(anyhow!("store.timeout_ms must be positive"));
        }
        self.session.utc_offset()?;
        Ok(())
    }
}
