use std::net::SocketAddr;

use crate::wire::DATA_PACKET_LEN;

/// The reflector core's view of the cross-mode bridge: just enough to decide
/// whether a source is the bridge's virtual peer and to hand off YSF traffic
/// for transcoding. Kept as a narrow trait so the reflector core can be
/// tested without a real DMR-network collaborator behind it.
pub trait BridgeCollaborator: Send + Sync {
    fn is_bridge_peer(&self, addr: SocketAddr) -> bool;
    fn offer_ysf_frame(&self, raw: &[u8; DATA_PACKET_LEN]);
}
