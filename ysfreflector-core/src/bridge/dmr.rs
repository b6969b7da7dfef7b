use crate::error::Result;

/// DMR call-type discriminant carried on every voice header/data/terminator
/// frame: a talkgroup (many-to-many) or a private (one-to-one) call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallType {
    Group,
    Private,
}

/// A packet received from the DMR network side. Only the `DMRD` (voice data)
/// variant carries fields the bridge acts on; everything else (login, pings)
/// is the DMR collaborator's own concern per the out-of-scope network-login
/// handshake note.
#[derive(Debug, Clone)]
pub enum DmrPacket {
    VoiceData(DmrVoiceData),
    Other,
}

#[derive(Debug, Clone)]
pub struct DmrVoiceData {
    pub src_id: u32,
    pub dst_id: u32,
    pub slot: u8,
    pub stream_id: u32,
    /// Raw AMBE-bearing payload as received from the network collaborator.
    pub data: Vec<u8>,
}

/// The packet interface the bridge consumes from an external DMR-network
/// collaborator. Authentication, RPTC repeater-config exchange, and keepalive
/// pings are the collaborator's own concern (§1 out-of-scope); the bridge only
/// depends on this narrow contract, matching the teacher's habit of putting a
/// trait at the I/O seam (`IoStream` in `tcp/handler.rs`) so the surrounding
/// logic is testable against a fake.
#[async_trait::async_trait]
pub trait DmrNetwork: Send + Sync {
    async fn start(&self) -> Result<()>;
    async fn stop(&self) -> Result<()>;
    fn get_stream_id(&self) -> u32;
    #[allow(clippy::too_many_arguments)]
    async fn send_voice_header(
        &self,
        src_id: u32,
        dst_id: u32,
        slot: u8,
        call_type: CallType,
        stream_id: u32,
    ) -> Result<()>;
    #[allow(clippy::too_many_arguments)]
    async fn send_voice_data(
        &self,
        src_id: u32,
        dst_id: u32,
        slot: u8,
        call_type: CallType,
        stream_id: u32,
        seq: u8,
        ambe: [u8; 33],
    ) -> Result<()>;
    #[allow(clippy::too_many_arguments)]
    async fn send_voice_terminator(
        &self,
        src_id: u32,
        dst_id: u32,
        slot: u8,
        call_type: CallType,
        stream_id: u32,
        seq: u8,
    ) -> Result<()>;
    async fn receive_packet(&self) -> Result<DmrPacket>;
}
