use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_SETTINGS_FILE: &str = "settings.adi.yml";

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: i32 = 5432;
const DEFAULT_DB_NAME: &str = "inventory";
const DEFAULT_USER: &str = "postgres";
const DEFAULT_CONNECT_TIMEOUT_SEC: i32 = 5;
const DEFAULT_QUERY_TIMEOUT_SEC: u64 = 30;
const DEFAULT_GROUPS_COLLECTION: &str = "groups";
const DEFAULT_HOSTS_COLLECTION: &str = "hosts";

// https://docs.rs/tokio-postgres/latest/tokio_postgres/config/struct.Config.html
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
pub struct Settings {
    pub host: Option<String>,
    pub port: Option<i32>,
    pub db_name: Option<String>,
    pub user: Option<String>,
    pub connect_timeout_sec: Option<i32>,
    pub query_timeout_sec: Option<u64>,
    pub groups_collection: Option<String>,
    pub hosts_collection: Option<String>,
}

impl Settings {
    pub fn connection_string(&self, password: Option<&str>) -> String {
        let mut parts = vec![
            format!("host={}", quote(self.host.as_deref().unwrap_or(DEFAULT_HOST))),
            format!("port={}", self.port.unwrap_or(DEFAULT_PORT)),
            format!(
                "dbname={}",
                quote(self.db_name.as_deref().unwrap_or(DEFAULT_DB_NAME))
            ),
            format!("user={}", quote(self.user.as_deref().unwrap_or(DEFAULT_USER))),
        ];
        if let Some(password) = password {
            parts.push(format!("password={}", quote(password)));
        }
        parts.push(format!(
            "connect_timeout={}",
            self.connect_timeout_sec.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SEC)
        ));
        parts.push("application_name=adi".to_string());
        parts.join(" ")
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_sec.unwrap_or(DEFAULT_QUERY_TIMEOUT_SEC))
    }

    pub fn groups_collection(&self) -> &str {
        self.groups_collection
            .as_deref()
            .unwrap_or(DEFAULT_GROUPS_COLLECTION)
    }

    pub fn hosts_collection(&self) -> &str {
        self.hosts_collection
            .as_deref()
            .unwrap_or(DEFAULT_HOSTS_COLLECTION)
    }
}

/// Quotes a libpq keyword value when it is empty or has spaces or quotes.
fn quote(value: &str) -> String {
    if !value.is_empty() && !value.contains([' ', '\'', '\\']) {
        return value.to_string();
    }
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}

pub struct SettingsManager {
    settings_file_name: String,
}

impl SettingsManager {
    pub fn new(settings_file_name: &str) -> Self {
        Self {
            settings_file_name: settings_file_name.to_string(),
        }
    }

    pub async fn load_settings_from_file(&self) -> Result<Settings> {
        let content = tokio::fs::read_to_string(&self.settings_file_name)
            .await
            .with_context(|| format!("Failed to read settings file: {}", self.settings_file_name))?;

        let settings: Option<Settings> = serde_yaml::from_str(&content).with_context(|| {
            format!(
                "Failed to deserialize settings file: {}",
                self.settings_file_name
            )
        })?;
        Ok(settings.unwrap_or_default())
    }

    /// Falls back to defaults when the default settings file is absent.
    pub async fn load_or_default(settings_file_name: Option<&str>) -> Result<Settings> {
        match settings_file_name {
            Some(name) => Self::new(name).load_settings_from_file().await,
            None if tokio::fs::try_exists(DEFAULT_SETTINGS_FILE)
                .await
                .unwrap_or(false) =>
            {
                Self::new(DEFAULT_SETTINGS_FILE).load_settings_from_file().await
            }
            None => {
                tracing::debug!("no settings file, using defaults");
                Ok(Settings::default())
            }
        }
    }
}
