#![forbid(unsafe_code)]

pub mod bitcodec;
pub mod blocklist;
pub mod bridge;
pub mod config;
pub mod error;
pub mod reflector;
pub mod registry;
pub mod server;
pub mod telemetry;
pub mod wire;

pub use blocklist::Blocklist;
pub use bridge::{CallType, CrossModeBridge, DmrNetwork, DmrPacket, SocketOwnership};
pub use config::{load_from_path, Config};
pub use error::{ReflectorError, Result};
pub use reflector::{BridgeCollaborator, Reflector};
pub use registry::{PeerRegistry, ReflectorEvent};
pub use server::{PacketHandler, UdpServer};
