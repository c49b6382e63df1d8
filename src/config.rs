//! Runtime configuration
//!
//! Secrets and tuning knobs are read from the process environment, after an
//! optional dotenv file has been loaded.

use crate::art::PollSettings;
use crate::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

pub const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const YANDEX_API_TOKEN: &str = "YANDEX_API_TOKEN";
pub const YANDEX_CATALOG_ID: &str = "YANDEX_CATALOG_ID";
pub const LOG_FILE: &str = "LOG_FILE";

pub const DEFAULT_API_BASE_URL: &str = "https://llm.api.cloud.yandex.net";

/// Load `path`, or `./.env` when no path is given and the file exists.
pub fn load_env_file(path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => dotenvy::from_path(path)
            .map_err(|e| Error::Config(format!("Failed to load {}: {}", path.display(), e))),
        None => {
            dotenvy::dotenv().ok();
            Ok(())
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub yandex_api_token: String,
    pub yandex_catalog_id: String,
    pub api_base_url: String,
    pub poll: PollSettings,
    /// Directory for the transient `image_<id>.jpeg` files.
    pub image_dir: PathBuf,
    pub drop_pending_updates: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("telegram_bot_token", &"<redacted>")
            .field("yandex_api_token", &"<redacted>")
            .field("yandex_catalog_id", &self.yandex_catalog_id)
            .field("api_base_url", &self.api_base_url)
            .field("poll", &self.poll)
            .field("image_dir", &self.image_dir)
            .field("drop_pending_updates", &self.drop_pending_updates)
            .finish()
    }
}

impl Config {
    /// Read the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let telegram_bot_token = get(TELEGRAM_BOT_TOKEN);
        let yandex_api_token = get(YANDEX_API_TOKEN);
        let yandex_catalog_id = get(YANDEX_CATALOG_ID);

        for (name, value) in [
            (TELEGRAM_BOT_TOKEN, &telegram_bot_token),
            (YANDEX_API_TOKEN, &yandex_api_token),
            (YANDEX_CATALOG_ID, &yandex_catalog_id),
        ] {
            info!("{}: {}", name, if value.is_some() { "Set" } else { "Not set" });
        }

        let (telegram_bot_token, yandex_api_token, yandex_catalog_id) =
            match (telegram_bot_token, yandex_api_token, yandex_catalog_id) {
                (Some(telegram), Some(api), Some(catalog)) => (telegram, api, catalog),
                (telegram, api, catalog) => {
                    let missing: Vec<&str> = [
                        (TELEGRAM_BOT_TOKEN, telegram.is_none()),
                        (YANDEX_API_TOKEN, api.is_none()),
                        (YANDEX_CATALOG_ID, catalog.is_none()),
                    ]
                    .into_iter()
                    .filter_map(|(name, absent)| absent.then_some(name))
                    .collect();
                    error!("Required environment variables missing: {}", missing.join(", "));
                    return Err(Error::Config(format!(
                        "missing required environment variables: {}",
                        missing.join(", ")
                    )));
                }
            };

        let defaults = PollSettings::default();
        let poll = PollSettings {
            request_timeout: secs_or(&get, "YANDEX_REQUEST_TIMEOUT_SECS", defaults.request_timeout)?,
            poll_interval: secs_or(&get, "YANDEX_POLL_INTERVAL_SECS", defaults.poll_interval)?,
            poll_budget: secs_or(&get, "YANDEX_POLL_BUDGET_SECS", defaults.poll_budget)?,
        };
        if poll.poll_interval.is_zero() {
            return Err(Error::Config(
                "YANDEX_POLL_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }

        let drop_pending_updates = match get("DROP_PENDING_UPDATES") {
            None => true,
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                Error::Config(format!("DROP_PENDING_UPDATES: expected a boolean, got '{}'", raw))
            })?,
        };

        Ok(Self {
            telegram_bot_token,
            yandex_api_token,
            yandex_catalog_id,
            api_base_url: get("YANDEX_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            poll,
            image_dir: get("IMAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            drop_pending_updates,
        })
    }

    /// `art://` reference of the latest YandexART model in the configured catalog.
    pub fn model_uri(&self) -> String {
        format!("art://{}/yandex-art/latest", self.yandex_catalog_id)
    }
}

fn secs_or<G>(get: &G, name: &str, default: Duration) -> Result<Duration>
where
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| Error::Config(format!("{}: expected whole seconds, got '{}'", name, raw))),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
