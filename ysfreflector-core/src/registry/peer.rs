use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Instant;

/// A snapshot of a peer's mutable counters, returned by `PeerRecord::snapshot`
/// to avoid handing out a lock guard to callers.
#[derive(Debug, Clone, Copy)]
pub struct PeerSnapshot {
    pub last_heard: Instant,
    pub rx_packets: u64,
    pub rx_bytes: u64,
    pub tx_packets: u64,
    pub tx_bytes: u64,
    pub muted_until: Option<Instant>,
}

struct PeerState {
    callsign: String,
    last_heard: Instant,
    rx_packets: u64,
    rx_bytes: u64,
    tx_packets: u64,
    tx_bytes: u64,
    muted_until: Option<Instant>,
}

/// A registered repeater. The map that owns `Arc<PeerRecord>` values only
/// locks on insert/remove; per-packet updates go through this record's own
/// mutex, matching the rate limiter's per-key interior state. `callsign`
/// lives under that same mutex — a repeater may re-poll under a new
/// callsign while its address (the stable identity) stays put.
pub struct PeerRecord {
    pub addr: SocketAddr,
    pub joined_at: Instant,
    state: Mutex<PeerState>,
}

impl PeerRecord {
    pub fn new(addr: SocketAddr, callsign: String, now: Instant) -> Self {
        Self {
            addr,
            joined_at: now,
            state: Mutex::new(PeerState {
                callsign,
                last_heard: now,
                rx_packets: 0,
                rx_bytes: 0,
                tx_packets: 0,
                tx_bytes: 0,
                muted_until: None,
            }),
        }
    }

    pub fn callsign(&self) -> String {
        self.state.lock().expect("peer lock poisoned").callsign.clone()
    }

    /// Updates the last-seen callsign and refreshes `last_heard` in one
    /// lock acquisition.
    pub fn touch(&self, now: Instant, callsign: &str) {
        let mut state = self.state.lock().expect("peer lock poisoned");
        state.last_heard = now;
        if state.callsign != callsign {
            state.callsign = callsign.to_string();
        }
    }

    pub fn record_rx(&self, now: Instant, callsign: &str, size: usize) {
        let mut state = self.state.lock().expect("peer lock poisoned");
        state.last_heard = now;
        if state.callsign != callsign {
            state.callsign = callsign.to_string();
        }
        state.rx_packets += 1;
        state.rx_bytes += size as u64;
    }

    pub fn record_tx(&self, size: usize) {
        let mut state = self.state.lock().expect("peer lock poisoned");
        state.tx_packets += 1;
        state.tx_bytes += size as u64;
    }

    pub fn mute_until(&self, until: Instant) {
        self.state.lock().expect("peer lock poisoned").muted_until = Some(until);
    }

    pub fn clear_mute(&self) {
        self.state.lock().expect("peer lock poisoned").muted_until = None;
    }

    pub fn is_muted(&self, now: Instant) -> bool {
        match self.state.lock().expect("peer lock poisoned").muted_until {
            Some(until) => now < until,
            None => false,
        }
    }

    pub fn last_heard(&self) -> Instant {
        self.state.lock().expect("peer lock poisoned").last_heard
    }

    pub fn snapshot(&self) -> PeerSnapshot {
        let state = self.state.lock().expect("peer lock poisoned");
        PeerSnapshot {
            last_heard: state.last_heard,
            rx_packets: state.rx_packets,
            rx_bytes: state.rx_bytes,
            tx_packets: state.tx_packets,
            tx_bytes: state.tx_bytes,
            muted_until: state.muted_until,
        }
    }
}
