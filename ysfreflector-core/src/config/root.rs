use serde::Deserialize;

use super::blocklist::BlocklistConfig;
use super::bridge::BridgeConfig;
use super::server::ServerConfig;
use super::telemetry::{LoggingConfig, TelemetryConfig};

/// Top-level reflector configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub blocklist: BlocklistConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
