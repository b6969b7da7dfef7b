use serde::Deserialize;

/// Static blocklist configuration, loaded at startup.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct BlocklistConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub callsigns: Vec<String>,
}
