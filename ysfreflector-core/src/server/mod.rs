mod handler;
mod stats;

pub use handler::PacketHandler;
pub use stats::{ServerStats, ServerStatsSnapshot};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::wire::{self, Packet};

const MAX_DATAGRAM_SIZE: usize = 2048;
const RECV_TIMEOUT: Duration = Duration::from_secs(1);

/// Owns one UDP socket. The receive loop never blocks on a handler: every
/// datagram is dispatched to its own task, following the same
/// `tokio::select!`-against-cancellation shape as the TCP accept loop.
pub struct UdpServer {
    socket: Arc<UdpSocket>,
    stats: Arc<ServerStats>,
}

impl UdpServer {
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        info!(%addr, "udp server bound");
        Ok(Self { socket: Arc::new(socket), stats: Arc::new(ServerStats::new()) })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    pub fn stats(&self) -> Arc<ServerStats> {
        self.stats.clone()
    }

    /// Blocking write; updates tx metrics; returns the error on socket
    /// failure rather than swallowing it (the caller decides whether a
    /// single-destination failure is fatal).
    pub async fn send(&self, data: &[u8], addr: SocketAddr) -> Result<()> {
        self.socket.send_to(data, addr).await?;
        self.stats.record_tx(data.len());
        Ok(())
    }

    /// Fire-and-forget broadcast: logs and continues past per-destination
    /// failures rather than aborting the whole fan-out.
    pub async fn broadcast(&self, data: &[u8], addrs: &[SocketAddr], exclude: Option<SocketAddr>) {
        for &addr in addrs {
            if Some(addr) == exclude {
                continue;
            }
            if let Err(e) = self.send(data, addr).await {
                warn!(%addr, error = %e, "broadcast send failed");
            }
        }
    }

    /// Receive loop. Reads with a 1-second timeout so cancellation is
    /// observed promptly; read timeouts are expected and not logged.
    pub async fn run(
        self: Arc<Self>,
        handler: Arc<dyn PacketHandler>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        let mut buf = [0u8; MAX_DATAGRAM_SIZE];
        loop {
            tokio::select! {
                res = shutdown.changed() => {
                    if res.is_ok() && *shutdown.borrow() {
                        info!("udp server: shutdown signal received");
                        break;
                    }
                }
                result = tokio::time::timeout(RECV_TIMEOUT, self.socket.recv_from(&mut buf)) => {
                    match result {
                        Err(_elapsed) => continue,
                        Ok(Err(e)) => {
                            warn!(error = %e, "udp recv_from failed");
                            continue;
                        }
                        Ok(Ok((n, addr))) => {
                            let datagram = buf[..n].to_vec();
                            let server = self.clone();
                            let handler = handler.clone();
                            tokio::spawn(async move {
                                server.dispatch(&datagram, addr, handler).await;
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    async fn dispatch(&self, datagram: &[u8], addr: SocketAddr, handler: Arc<dyn PacketHandler>) {
        let parsed = wire::parse(datagram);
        self.stats.record_rx(parsed.as_ref().ok().map(Packet::packet_type), datagram.len());

        match parsed {
            Ok(Packet::Poll { callsign }) => handler.handle_poll(callsign, addr).await,
            Ok(Packet::Data { raw }) => handler.handle_data(raw, addr).await,
            Ok(Packet::Unlink { callsign }) => handler.handle_unlink(callsign, addr).await,
            Ok(Packet::StatusRequest) => handler.handle_status_request(addr).await,
            Ok(Packet::StatusResponse { .. } | Packet::Advisory) => {
                debug!(%addr, "no handler registered for this packet type");
            }
            Err(e) => debug!(%addr, error = %e, "failed to parse datagram"),
        }
    }
}
