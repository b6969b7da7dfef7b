mod blocklist;
mod bridge;
mod loader;
mod root;
mod server;
mod telemetry;

pub use blocklist::BlocklistConfig;
pub use bridge::BridgeConfig;
pub use loader::{canonical_blocklist, load_from_path};
pub use root::Config;
pub use server::ServerConfig;
pub use telemetry::{LoggingConfig, TelemetryConfig};
