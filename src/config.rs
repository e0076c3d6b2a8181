use std::path::Path;

use anyhow::Context as _;
use mac_address::MacAddress;
use serde_derive::Deserialize;

use crate::classifier::DispatchRevision;

#[derive(Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub mqtt: MqttConfig,
    pub devices: Option<Vec<TpmsDevice>>,
    pub scan: Option<ScanConfig>,
    #[serde(default)]
    pub decoder: DecoderConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct MqttConfig {
    pub host: String,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub publisher_id: Option<String>,
    pub topic_path: Option<String>,
    pub keep_alive_seconds: Option<u64>,
}

/// A sensor to publish. When any are configured, readings from other
/// addresses are dropped.
#[derive(Deserialize, Debug, Clone)]
pub struct TpmsDevice {
    pub address: MacAddress,
    pub name: String,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct ScanConfig {
    /// Minimum time between two published readings of one sensor.
    pub publish_debounce_seconds: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct DecoderConfig {
    #[serde(default)]
    pub revision: DispatchRevision,
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config = toml::de::from_str(&contents)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    /// Configured display name for an address, if the address is known.
    pub fn device_name(&self, address: &MacAddress) -> Option<&str> {
        self.devices
            .iter()
            .flatten()
            .find(|d| d.address == *address)
            .map(|d| d.name.as_str())
    }

    pub fn has_allowlist(&self) -> bool {
        self.devices.as_ref().is_some_and(|d| !d.is_empty())
    }
}
