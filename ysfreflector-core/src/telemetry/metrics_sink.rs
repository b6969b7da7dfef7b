use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::info;

use crate::registry::ReflectorEvent;
use crate::server::UdpServer;
use crate::telemetry::Metrics;

const STATS_SYNC_INTERVAL: Duration = Duration::from_secs(5);

/// Drains registry events into the process metrics and periodically folds
/// `ServerStats` deltas into the packet/byte counters. A consumer task
/// rather than inline instrumentation, so the hot receive path never blocks
/// on an exporter.
pub async fn run_metrics_sink(
    metrics: Arc<Metrics>,
    server: Arc<UdpServer>,
    mut events: mpsc::Receiver<ReflectorEvent>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut last_rx_packets = 0u64;
    let mut last_tx_packets = 0u64;
    let mut last_rx_bytes = 0u64;
    let mut last_tx_bytes = 0u64;
    let mut ticker = tokio::time::interval(STATS_SYNC_INTERVAL);

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(ReflectorEvent::PeerJoined { .. }) => metrics.peers_active.add(1, &[]),
                    Some(ReflectorEvent::PeerLeft { .. }) => metrics.peers_active.add(-1, &[]),
                    Some(ReflectorEvent::TalkStart { .. }) => metrics.talk_starts_total.add(1, &[]),
                    Some(ReflectorEvent::TalkEnd { .. }) => metrics.talk_ends_total.add(1, &[]),
                    None => {
                        info!("metrics sink: event channel closed");
                        return;
                    }
                }
            }
            _ = ticker.tick() => {
                let snap = server.stats().snapshot();
                let rx_packets = snap.rx_poll
                    + snap.rx_data
                    + snap.rx_unlink
                    + snap.rx_status_request
                    + snap.rx_status_response
                    + snap.rx_advisory;
                metrics.packets_received_total.add(rx_packets.saturating_sub(last_rx_packets), &[]);
                metrics
                    .packets_transmitted_total
                    .add(snap.tx_packets_total.saturating_sub(last_tx_packets), &[]);
                metrics.bytes_received_total.add(snap.rx_bytes_total.saturating_sub(last_rx_bytes), &[]);
                metrics
                    .bytes_transmitted_total
                    .add(snap.tx_bytes_total.saturating_sub(last_tx_bytes), &[]);
                last_rx_packets = rx_packets;
                last_tx_packets = snap.tx_packets_total;
                last_rx_bytes = snap.rx_bytes_total;
                last_tx_bytes = snap.tx_bytes_total;
            }
            res = shutdown.changed() => {
                if res.is_ok() && *shutdown.borrow() {
                    info!("metrics sink stopping");
                    break;
                }
            }
        }
    }
}
