use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::{ReflectorError, Result};
use crate::wire::sanitize_callsign;

pub fn load_from_path<P: AsRef<Path>>(p: P) -> Result<Config> {
    let txt = fs::read_to_string(p)
        .map_err(|e| ReflectorError::Config(format!("failed to read config file: {e}")))?;
    let cfg: Config = toml::from_str(&txt)
        .map_err(|e| ReflectorError::Config(format!("failed to parse config: {e}")))?;

    validate_config(&cfg)?;

    Ok(cfg)
}

fn validate_config(cfg: &Config) -> Result<()> {
    if cfg.server.name.trim().is_empty() {
        return Err(ReflectorError::Config("server.name must not be empty".to_string()));
    }

    if cfg.server.max_connections == 0 {
        return Err(ReflectorError::Config(
            "server.max_connections must be greater than zero".to_string(),
        ));
    }

    if cfg.bridge.enabled && cfg.bridge.dmr_addr.trim().is_empty() {
        return Err(ReflectorError::Config(
            "bridge.dmr_addr is required when bridge.enabled is true".to_string(),
        ));
    }

    Ok(())
}

/// Canonicalizes (sanitizes, truncates) every blocklist entry. Silent
/// normalization rather than a hard validation error: the sanitizer is
/// idempotent, so an oversized or lower-case entry simply folds to its
/// canonical form instead of being rejected.
pub fn canonical_blocklist(cfg: &Config) -> Vec<String> {
    cfg.blocklist.callsigns.iter().map(|cs| sanitize_callsign(cs.as_bytes())).collect()
}
