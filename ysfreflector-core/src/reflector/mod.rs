mod bridge_collaborator;

pub use bridge_collaborator::BridgeCollaborator;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::registry::PeerRegistry;
use crate::server::{PacketHandler, UdpServer};
use crate::telemetry::Metrics;
use crate::wire::{self, PacketType, DATA_PACKET_LEN};

const GATEWAY_IDENTITY: &str = "REFLECTOR";
const STATS_LOG_INTERVAL: Duration = Duration::from_secs(300);

/// Wires the four YSF handlers to the peer registry and, optionally, the
/// cross-mode bridge.
pub struct Reflector {
    server: Arc<UdpServer>,
    registry: Arc<PeerRegistry>,
    bridge: Option<Arc<dyn BridgeCollaborator>>,
    status_name: String,
    status_description: String,
    metrics: Option<Arc<Metrics>>,
}

impl Reflector {
    pub fn new(
        server: Arc<UdpServer>,
        registry: Arc<PeerRegistry>,
        bridge: Option<Arc<dyn BridgeCollaborator>>,
        status_name: String,
        status_description: String,
    ) -> Self {
        Self { server, registry, bridge, status_name, status_description, metrics: None }
    }

    /// Attaches the process metrics, incremented inline on the handler paths
    /// that the event channel doesn't cover (rejected/blocked polls).
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn is_bridge_peer(&self, addr: SocketAddr) -> bool {
        self.bridge.as_ref().is_some_and(|b| b.is_bridge_peer(addr))
    }

    /// Background task logging a peer-count/throughput summary every five
    /// minutes, following the teacher's periodic connection-count logging.
    pub async fn start_stats_logger(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(STATS_LOG_INTERVAL);
        ticker.tick().await; // first tick fires immediately; skip it
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let snapshot = self.server.stats().snapshot();
                    info!(
                        peers = self.registry.count(),
                        rx_poll = snapshot.rx_poll,
                        rx_data = snapshot.rx_data,
                        rx_bytes_total = snapshot.rx_bytes_total,
                        tx_packets_total = snapshot.tx_packets_total,
                        tx_bytes_total = snapshot.tx_bytes_total,
                        uptime_secs = snapshot.uptime_secs,
                        "reflector stats"
                    );
                }
                res = shutdown.changed() => {
                    if res.is_ok() && *shutdown.borrow() {
                        info!("stats logger stopping");
                        break;
                    }
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl PacketHandler for Reflector {
    async fn handle_poll(&self, callsign: [u8; 10], addr: SocketAddr) {
        if self.is_bridge_peer(addr) {
            // The bridge's virtual peer polls are not repeaters; do not register.
        } else {
            let canonical = wire::sanitize_callsign(&callsign);
            if self.registry.add_or_touch(&canonical, addr).is_none() {
                warn!(%addr, callsign = %canonical, "poll rejected");
                if let Some(metrics) = &self.metrics {
                    if self.registry.is_blocked(&canonical) {
                        metrics.peers_blocked_total.add(1, &[]);
                    } else {
                        metrics.peers_rejected_total.add(1, &[]);
                    }
                }
                return;
            }
        }

        let response = wire::build_poll(GATEWAY_IDENTITY);
        if let Err(e) = self.server.send(&response, addr).await {
            warn!(%addr, error = %e, "failed to send poll response");
            return;
        }
        self.registry.process_transmit(addr, response.len());
    }

    async fn handle_data(&self, raw: [u8; DATA_PACKET_LEN], addr: SocketAddr) {
        if self.is_bridge_peer(addr) {
            let repeaters = self.registry.all_addresses();
            self.server.broadcast(&raw, &repeaters, None).await;
            for peer_addr in repeaters {
                self.registry.process_transmit(peer_addr, raw.len());
            }
            return;
        }

        if self.registry.get(addr).is_none() {
            return;
        }
        let canonical = wire::sanitize_callsign(wire::data_source_callsign(&raw));

        self.registry.process_packet(&canonical, addr, PacketType::Data, raw.len());

        let repeaters = self.registry.all_addresses();
        self.server.broadcast(&raw, &repeaters, Some(addr)).await;
        for peer_addr in repeaters {
            if peer_addr != addr {
                self.registry.process_transmit(peer_addr, raw.len());
            }
        }

        if let Some(bridge) = &self.bridge {
            bridge.offer_ysf_frame(&raw);
        }
    }

    async fn handle_unlink(&self, _callsign: [u8; 10], addr: SocketAddr) {
        self.registry.remove(addr);
    }

    async fn handle_status_request(&self, addr: SocketAddr) {
        let response = wire::build_status_response(
            &self.status_name,
            &self.status_description,
            self.registry.count().min(999) as u16,
        );
        if let Err(e) = self.server.send(&response, addr).await {
            warn!(%addr, error = %e, "failed to send status response");
            return;
        }
        self.registry.process_transmit(addr, response.len());
    }
}
