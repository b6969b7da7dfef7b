use serde::Deserialize;

/// Logging configuration, consumed by `ysfreflector::init_tracing`.
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_level(), show_target: false }
    }
}

fn default_level() -> String {
    "info".to_string()
}

/// Metrics/telemetry configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub metrics_enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self { metrics_enabled: false, metrics_port: default_metrics_port() }
    }
}

fn default_metrics_port() -> u16 {
    9090
}
