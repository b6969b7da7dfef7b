use serde::Deserialize;

/// UDP server and reflector identity configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Interface to bind the reflector's UDP socket to.
    #[serde(default = "default_host")]
    pub host: String,
    /// UDP port to bind.
    pub port: u16,
    /// Reflector name, advertised in status responses.
    pub name: String,
    /// Reflector description, advertised in status responses.
    #[serde(default)]
    pub description: String,
    /// Maximum number of concurrently registered peers.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Peer inactivity timeout, in seconds, before eviction.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Maximum continuous talk duration, in seconds, before a peer is muted.
    #[serde(default = "default_talk_max_duration")]
    pub talk_max_duration: u64,
    /// Cooldown, in seconds, applied after a talk-time violation.
    #[serde(default = "default_unmute_after")]
    pub unmute_after: u64,
    /// Interval, in seconds, between peer-cleanup sweeps.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval: u64,
    /// Silence gap, in seconds, after which the active talker is considered
    /// to have released the channel.
    #[serde(default = "default_silence_gap")]
    pub silence_gap: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: 42000,
            name: String::new(),
            description: String::new(),
            max_connections: default_max_connections(),
            timeout: default_timeout(),
            talk_max_duration: default_talk_max_duration(),
            unmute_after: default_unmute_after(),
            cleanup_interval: default_cleanup_interval(),
            silence_gap: default_silence_gap(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_max_connections() -> usize {
    128
}

fn default_timeout() -> u64 {
    5
}

fn default_talk_max_duration() -> u64 {
    180
}

fn default_unmute_after() -> u64 {
    10
}

fn default_cleanup_interval() -> u64 {
    1
}

fn default_silence_gap() -> u64 {
    2
}
