/*!
 * Bridge Configuration
 * Defaults, JSON file loading and BRIDGE_* environment overrides
 */

use crate::acquire::FilterSpec;
use crate::core::errors::{BridgeError, BridgeResult};
use crate::core::limits::{DEFAULT_DESCRIPTOR_CAPACITY, FIRST_GUEST_DESCRIPTOR, MAX_GUEST_DESCRIPTOR};
use crate::rights::{Rights, RightsSet};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Path of an optional JSON configuration file
pub const CONFIG_PATH_ENV: &str = "BRIDGE_CONFIG";

/// Which bus platform the bridge drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformSelection {
    /// SocketCAN when the host supports it, virtual otherwise
    #[default]
    Auto,
    /// Always use in-memory endpoints
    Virtual,
}

impl FromStr for PlatformSelection {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "virtual" => Ok(Self::Virtual),
            other => Err(BridgeError::configuration(format!(
                "unknown platform '{}', expected auto or virtual",
                other
            ))),
        }
    }
}

/// Per-sandbox bridge configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Descriptor slots in the sandbox's table
    pub table_capacity: usize,
    /// Lowest descriptor the table hands out
    pub first_descriptor: u32,
    /// Ceiling for every right granted in this sandbox
    pub max_rights: RightsSet,
    /// Rights requested for each opened bus endpoint
    pub socket_rights: RightsSet,
    /// Inbound filter installed on opened endpoints
    pub filter: FilterSpec,
    /// Wait after bringing an endpoint up; `None` keeps the platform default
    pub settle_delay_ms: Option<u64>,
    pub platform: PlatformSelection,
    /// Endpoints the virtual platform exposes (all start inactive)
    pub virtual_endpoints: Vec<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            table_capacity: DEFAULT_DESCRIPTOR_CAPACITY,
            first_descriptor: FIRST_GUEST_DESCRIPTOR,
            max_rights: RightsSet::ALL,
            socket_rights: RightsSet::from_rights(Rights::BUS_SOCKET, Rights::empty()),
            filter: FilterSpec::ALLOW_ALL,
            settle_delay_ms: None,
            platform: PlatformSelection::Auto,
            virtual_endpoints: vec!["vcan0".to_string()],
        }
    }
}

impl BridgeConfig {
    /// Load from `BRIDGE_CONFIG` (if set), then apply environment overrides
    pub fn load() -> BridgeResult<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            BridgeError::configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> BridgeResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| BridgeError::configuration(format!("invalid configuration: {}", e)))
    }

    /// Apply BRIDGE_* environment overrides
    ///
    /// Environment variables:
    /// - BRIDGE_TABLE_CAPACITY: descriptor slots
    /// - BRIDGE_FIRST_DESCRIPTOR: lowest descriptor handed out
    /// - BRIDGE_PLATFORM: auto | virtual
    /// - BRIDGE_SETTLE_DELAY_MS: bring-up settle delay
    /// - BRIDGE_VIRTUAL_ENDPOINTS: comma-separated endpoint names
    pub fn apply_env(&mut self) -> BridgeResult<()> {
        if let Some(capacity) = env_parse("BRIDGE_TABLE_CAPACITY")? {
            self.table_capacity = capacity;
        }
        if let Some(first) = env_parse("BRIDGE_FIRST_DESCRIPTOR")? {
            self.first_descriptor = first;
        }
        if let Some(platform) = env_parse("BRIDGE_PLATFORM")? {
            self.platform = platform;
        }
        if let Some(delay) = env_parse("BRIDGE_SETTLE_DELAY_MS")? {
            self.settle_delay_ms = Some(delay);
        }
        if let Ok(list) = std::env::var("BRIDGE_VIRTUAL_ENDPOINTS") {
            self.virtual_endpoints = list
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect();
        }
        Ok(())
    }

    pub fn validate(&self) -> BridgeResult<()> {
        if self.table_capacity == 0 {
            return Err(BridgeError::configuration("table_capacity must be non-zero"));
        }
        // Descriptors travel back to the guest as non-negative i32 values
        let last = self.first_descriptor as u64 + self.table_capacity as u64 - 1;
        if last > MAX_GUEST_DESCRIPTOR as u64 {
            return Err(BridgeError::configuration(
                "descriptor range exceeds the guest's signed 32-bit range",
            ));
        }
        if !self.socket_rights.is_subset_of(&self.max_rights) {
            return Err(BridgeError::configuration(format!(
                "socket_rights ({}) exceed max_rights ({})",
                self.socket_rights, self.max_rights
            )));
        }
        Ok(())
    }

    pub fn settle_delay(&self) -> Option<Duration> {
        self.settle_delay_ms.map(Duration::from_millis)
    }
}

fn env_parse<T>(key: &str) -> BridgeResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| BridgeError::configuration(format!("{}: {}", key, e))),
        Err(_) => Ok(None),
    }
}
