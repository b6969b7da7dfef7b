use std::net::SocketAddr;
use std::time::{Duration, SystemTime};

/// An arbitration or membership event, emitted over a bounded channel for an
/// external collaborator (stats logger, dashboard, test harness) to consume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReflectorEvent {
    TalkStart { callsign: String, addr: SocketAddr, timestamp: SystemTime },
    TalkEnd { callsign: String, addr: SocketAddr, timestamp: SystemTime, duration: Duration },
    PeerJoined { callsign: String, addr: SocketAddr, timestamp: SystemTime },
    PeerLeft { callsign: String, addr: SocketAddr, timestamp: SystemTime },
}
