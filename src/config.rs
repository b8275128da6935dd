use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const CONFIG_FILE: &str = "config.yaml";

/// The one account login accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            email: "admin@admin.com".to_string(),
            password: "1234".to_string(),
        }
    }
}

impl Credentials {
    pub fn matches(&self, email: &str, password: &str) -> bool {
        self.email == email && self.password == password
    }
}

/// Settings read from `.stockflow/config.yaml`. Missing fields take defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StockflowConfig {
    /// Stock at or below this is flagged low
    pub low_stock_threshold: i64,
    /// Stock at or below this is flagged critical
    pub critical_stock_threshold: i64,
    /// Entries kept in the dashboard activity feed
    pub activity_feed_limit: usize,
    /// Pause after a successful submit before moving on
    pub redirect_delay_ms: u64,
    /// How long a notification stays visible
    pub toast_duration_ms: u64,
    pub credentials: Credentials,
}

impl Default for StockflowConfig {
    fn default() -> Self {
        Self {
            low_stock_threshold: 10,
            critical_stock_threshold: 5,
            activity_feed_limit: 10,
            redirect_delay_ms: 500,
            toast_duration_ms: 2000,
            credentials: Credentials::default(),
        }
    }
}

impl StockflowConfig {
    /// Load from `dir`, or defaults if there is no config file
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(dir.join(CONFIG_FILE), yaml)?;
        Ok(())
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }
}
