use serde::Deserialize;

/// Cross-mode YSF<->DMR bridge configuration.
///
/// The bridge owns at most one in-flight call per direction, so a single
/// optional block is sufficient here (the teacher's pattern of a `Vec<Backend>`
/// does not apply: there is only ever one bridge).
#[derive(Debug, Deserialize, Clone)]
pub struct BridgeConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Local address the bridge's own YSF-side traffic originates from.
    #[serde(default = "default_ysf_local_addr")]
    pub ysf_local_addr: String,
    #[serde(default)]
    pub ysf_local_port: u16,
    /// Gateway callsign used as the source of bridged YSFD packets.
    #[serde(default = "default_gateway_callsign")]
    pub gateway_callsign: String,
    #[serde(default)]
    pub dmr_addr: String,
    #[serde(default)]
    pub dmr_port: u16,
    #[serde(default)]
    pub dmr_id: u32,
    #[serde(default)]
    pub dmr_password: String,
    #[serde(default)]
    pub dmr_callsign: String,
    #[serde(default = "default_dmr_slot")]
    pub dmr_slot: u8,
    #[serde(default)]
    pub dmr_talkgroup: u32,
    #[serde(default = "default_ping_interval")]
    pub dmr_ping_interval: u64,
    #[serde(default = "default_auth_timeout")]
    pub dmr_auth_timeout: u64,
    #[serde(default)]
    pub lookup_file_path: Option<String>,
    #[serde(default)]
    pub lookup_download_url: Option<String>,
    #[serde(default)]
    pub lookup_auto_download: bool,
    #[serde(default = "default_refresh_interval")]
    pub lookup_refresh_interval: u64,
    /// Call hang time, in seconds, before a bridged call is considered over.
    #[serde(default = "default_hang_time")]
    pub hang_time: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ysf_local_addr: default_ysf_local_addr(),
            ysf_local_port: 0,
            gateway_callsign: default_gateway_callsign(),
            dmr_addr: String::new(),
            dmr_port: 0,
            dmr_id: 0,
            dmr_password: String::new(),
            dmr_callsign: String::new(),
            dmr_slot: default_dmr_slot(),
            dmr_talkgroup: 0,
            dmr_ping_interval: default_ping_interval(),
            dmr_auth_timeout: default_auth_timeout(),
            lookup_file_path: None,
            lookup_download_url: None,
            lookup_auto_download: false,
            lookup_refresh_interval: default_refresh_interval(),
            hang_time: default_hang_time(),
        }
    }
}

fn default_ysf_local_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_gateway_callsign() -> String {
    "BRIDGE".to_string()
}

fn default_dmr_slot() -> u8 {
    2
}

fn default_ping_interval() -> u64 {
    5
}

fn default_auth_timeout() -> u64 {
    5
}

fn default_refresh_interval() -> u64 {
    3600
}

fn default_hang_time() -> u64 {
    5
}
