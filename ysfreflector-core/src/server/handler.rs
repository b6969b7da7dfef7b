use std::net::SocketAddr;

/// Closed set of YSF packet handlers, dispatched by tagged match rather than
/// a runtime type→callback map (the set of wire packet types is fixed).
#[async_trait::async_trait]
pub trait PacketHandler: Send + Sync {
    async fn handle_poll(&self, callsign: [u8; 10], addr: SocketAddr);
    async fn handle_data(&self, raw: [u8; crate::wire::DATA_PACKET_LEN], addr: SocketAddr);
    async fn handle_unlink(&self, callsign: [u8; 10], addr: SocketAddr);
    async fn handle_status_request(&self, addr: SocketAddr);
}
