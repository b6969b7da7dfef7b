use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::wire::PacketType;

/// Per-type receive counters plus aggregate byte/packet totals. Grounded on
/// the teacher's `tcp::metrics::ConnectionCount`, extended from a single
/// current/total/errors triple to one counter per wire packet type.
#[derive(Debug)]
pub struct ServerStats {
    rx_poll: AtomicU64,
    rx_data: AtomicU64,
    rx_unlink: AtomicU64,
    rx_status_request: AtomicU64,
    rx_status_response: AtomicU64,
    rx_advisory: AtomicU64,
    rx_unparsed: AtomicU64,
    rx_bytes_total: AtomicU64,
    tx_packets_total: AtomicU64,
    tx_bytes_total: AtomicU64,
    start_time: Instant,
}

/// A deep-copied point-in-time view of `ServerStats`, so readers never
/// observe a torn combination of counters.
#[derive(Debug, Clone, Copy)]
pub struct ServerStatsSnapshot {
    pub rx_poll: u64,
    pub rx_data: u64,
    pub rx_unlink: u64,
    pub rx_status_request: u64,
    pub rx_status_response: u64,
    pub rx_advisory: u64,
    pub rx_unparsed: u64,
    pub rx_bytes_total: u64,
    pub tx_packets_total: u64,
    pub tx_bytes_total: u64,
    pub uptime_secs: u64,
}

impl ServerStats {
    pub fn new() -> Self {
        Self {
            rx_poll: AtomicU64::new(0),
            rx_data: AtomicU64::new(0),
            rx_unlink: AtomicU64::new(0),
            rx_status_request: AtomicU64::new(0),
            rx_status_response: AtomicU64::new(0),
            rx_advisory: AtomicU64::new(0),
            rx_unparsed: AtomicU64::new(0),
            rx_bytes_total: AtomicU64::new(0),
            tx_packets_total: AtomicU64::new(0),
            tx_bytes_total: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_rx(&self, packet_type: Option<PacketType>, size: usize) {
        let counter = match packet_type {
            Some(PacketType::Poll) => &self.rx_poll,
            Some(PacketType::Data) => &self.rx_data,
            Some(PacketType::Unlink) => &self.rx_unlink,
            Some(PacketType::StatusRequest) => &self.rx_status_request,
            Some(PacketType::StatusResponse) => &self.rx_status_response,
            Some(PacketType::Advisory) => &self.rx_advisory,
            None => &self.rx_unparsed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.rx_bytes_total.fetch_add(size as u64, Ordering::Relaxed);
    }

    pub fn record_tx(&self, size: usize) {
        self.tx_packets_total.fetch_add(1, Ordering::Relaxed);
        self.tx_bytes_total.fetch_add(size as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ServerStatsSnapshot {
        ServerStatsSnapshot {
            rx_poll: self.rx_poll.load(Ordering::Relaxed),
            rx_data: self.rx_data.load(Ordering::Relaxed),
            rx_unlink: self.rx_unlink.load(Ordering::Relaxed),
            rx_status_request: self.rx_status_request.load(Ordering::Relaxed),
            rx_status_response: self.rx_status_response.load(Ordering::Relaxed),
            rx_advisory: self.rx_advisory.load(Ordering::Relaxed),
            rx_unparsed: self.rx_unparsed.load(Ordering::Relaxed),
            rx_bytes_total: self.rx_bytes_total.load(Ordering::Relaxed),
            tx_packets_total: self.tx_packets_total.load(Ordering::Relaxed),
            tx_bytes_total: self.tx_bytes_total.load(Ordering::Relaxed),
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for ServerStats {
    fn default() -> Self {
        Self::new()
    }
}
