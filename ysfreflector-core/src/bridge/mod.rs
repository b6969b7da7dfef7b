mod dmr;
mod lookup;
mod state;
mod transcode;
mod voice_layout;

pub use dmr::{CallType, DmrNetwork, DmrPacket, DmrVoiceData};
pub use lookup::CallsignLookup;
pub use state::{BridgeDirection, CallState};

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::reflector::BridgeCollaborator;
use crate::registry::PeerRegistry;
use crate::server::UdpServer;
use crate::telemetry::Metrics;
use crate::wire::{self, DATA_PACKET_LEN};

/// Whether the bridge's YSF-side UDP traffic rides the reflector's own
/// socket or a socket the bridge opened itself. Per design note §9: if
/// shared (`Borrowed`), the bridge must never close it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketOwnership {
    Borrowed,
    Owned,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BridgeCounters {
    pub total_calls: u64,
    pub ysf_to_dmr_calls: u64,
    pub dmr_to_ysf_calls: u64,
    pub frames_dropped: u64,
}

/// Owns the single in-flight cross-mode call and drives the YSF<->DMR
/// transcode pipeline. Consumes parsed YSF data packets from the reflector
/// core (via `BridgeCollaborator`) and DMR packets from an external
/// `DmrNetwork` collaborator.
pub struct CrossModeBridge {
    self_weak: Weak<Self>,
    config: BridgeConfig,
    dmr: Arc<dyn DmrNetwork>,
    server: Arc<UdpServer>,
    registry: Arc<PeerRegistry>,
    lookup: Option<Arc<CallsignLookup>>,
    metrics: Option<Arc<Metrics>>,
    ownership: SocketOwnership,
    virtual_peer_addr: Option<SocketAddr>,
    call: Mutex<Option<CallState>>,
    hang_time: Duration,
    total_calls: AtomicU64,
    ysf_to_dmr_calls: AtomicU64,
    dmr_to_ysf_calls: AtomicU64,
    frames_dropped: AtomicU64,
}

impl CrossModeBridge {
    pub fn new(
        config: BridgeConfig,
        dmr: Arc<dyn DmrNetwork>,
        server: Arc<UdpServer>,
        registry: Arc<PeerRegistry>,
        lookup: Option<Arc<CallsignLookup>>,
        metrics: Option<Arc<Metrics>>,
        ownership: SocketOwnership,
    ) -> Arc<Self> {
        let virtual_peer_addr = format!("{}:{}", config.ysf_local_addr, config.ysf_local_port)
            .parse::<SocketAddr>()
            .ok()
            .filter(|_| config.ysf_local_port != 0);
        let hang_time = Duration::from_secs(config.hang_time);
        Arc::new_cyclic(|weak| Self {
            self_weak: weak.clone(),
            config,
            dmr,
            server,
            registry,
            lookup,
            metrics,
            ownership,
            virtual_peer_addr,
            call: Mutex::new(None),
            hang_time,
            total_calls: AtomicU64::new(0),
            ysf_to_dmr_calls: AtomicU64::new(0),
            dmr_to_ysf_calls: AtomicU64::new(0),
            frames_dropped: AtomicU64::new(0),
        })
    }

    pub fn counters(&self) -> BridgeCounters {
        BridgeCounters {
            total_calls: self.total_calls.load(Ordering::Relaxed),
            ysf_to_dmr_calls: self.ysf_to_dmr_calls.load(Ordering::Relaxed),
            dmr_to_ysf_calls: self.dmr_to_ysf_calls.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
        }
    }

    /// A no-op on the socket when `Borrowed`; the reflector's UDP server
    /// keeps running. Only present so callers have an explicit shutdown
    /// point for the bridge's own bookkeeping.
    pub async fn stop(&self) {
        if self.ownership == SocketOwnership::Owned {
            debug!("bridge: owned socket shutdown would happen here");
        }
        let _ = self.dmr.stop().await;
    }

    async fn handle_ysf_frame(self: Arc<Self>, raw: [u8; DATA_PACKET_LEN]) {
        let source = wire::sanitize_callsign(wire::data_source_callsign(&raw));
        let now = Instant::now();

        let plan = {
            let mut guard = self.call.lock().await;
            match guard.as_mut() {
                Some(call) if call.direction != BridgeDirection::YsfToDmr => None,
                Some(call) => {
                    let seqs = call.next_seqs(now, voice_layout::VOICE_CHANNELS);
                    Some((false, call.dmr_id, call.stream_id, call.slot, seqs))
                }
                None => {
                    let dmr_id = self
                        .lookup
                        .as_ref()
                        .and_then(|l| l.id_for_callsign(&source))
                        .unwrap_or(self.config.dmr_id);
                    let stream_id = self.dmr.get_stream_id();
                    let mut new_call = CallState::new(
                        BridgeDirection::YsfToDmr,
                        source.clone(),
                        dmr_id,
                        self.config.dmr_talkgroup,
                        self.config.dmr_slot,
                        stream_id,
                        now,
                    );
                    let seqs = new_call.next_seqs(now, voice_layout::VOICE_CHANNELS);
                    let slot = new_call.slot;
                    *guard = Some(new_call);
                    self.total_calls.fetch_add(1, Ordering::Relaxed);
                    self.ysf_to_dmr_calls.fetch_add(1, Ordering::Relaxed);
                    if let Some(m) = &self.metrics {
                        m.bridge_calls_total.add(1, &[]);
                    }
                    Some((true, dmr_id, stream_id, slot, seqs))
                }
            }
        };

        let Some((is_new, dmr_id, stream_id, slot, seqs)) = plan else {
            debug!(%source, "bridge: dropping YSF frame, opposite-direction DMR call in progress");
            return;
        };

        if is_new {
            if let Err(e) = self
                .dmr
                .send_voice_header(dmr_id, self.config.dmr_talkgroup, slot, CallType::Group, stream_id)
                .await
            {
                warn!(error = %e, "bridge: failed to send DMR voice header");
            }
            info!(%source, dmr_id, stream_id, "bridge: started YSF->DMR call");
        }

        for (channel, seq) in seqs.into_iter().enumerate() {
            let frame = voice_layout::read_channel(&raw, channel);
            let dmr_slot = transcode::ysf_ambe_to_dmr_slot(&frame);
            let ambe = transcode::dmr_slot_to_wire_ambe(&dmr_slot);

            if let Err(e) = self
                .dmr
                .send_voice_data(dmr_id, self.config.dmr_talkgroup, slot, CallType::Group, stream_id, seq, ambe)
                .await
            {
                self.frames_dropped.fetch_add(1, Ordering::Relaxed);
                if let Some(m) = &self.metrics {
                    m.bridge_frames_dropped_total.add(1, &[]);
                }
                warn!(error = %e, channel, "bridge: failed to send DMR voice data frame, dropping");
            }
        }
    }

    async fn handle_dmr_voice(self: Arc<Self>, voice: DmrVoiceData) {
        if voice.slot != self.config.dmr_slot || voice.dst_id != self.config.dmr_talkgroup {
            return;
        }
        let now = Instant::now();

        let flush = {
            let mut guard = self.call.lock().await;
            match guard.as_mut() {
                Some(call) if call.direction != BridgeDirection::DmrToYsf => None,
                Some(call) => {
                    call.touch(now);
                    let slot_bytes = transcode::wire_ambe_to_dmr_slot(&voice.data);
                    let ambe = transcode::dmr_slot_to_ysf_ambe(&slot_bytes);
                    call.ysf_frame_buffer.push(ambe);
                    if call.ysf_frame_buffer.len() == voice_layout::VOICE_CHANNELS {
                        let frames = std::mem::take(&mut call.ysf_frame_buffer);
                        Some((frames, call.source_callsign.clone(), call.wire_seq()))
                    } else {
                        None
                    }
                }
                None => {
                    let source = self
                        .lookup
                        .as_ref()
                        .and_then(|l| l.callsign_for_id(voice.src_id))
                        .unwrap_or_else(|| format!("DMR{}", voice.src_id));
                    let mut new_call = CallState::new(
                        BridgeDirection::DmrToYsf,
                        source,
                        voice.src_id,
                        voice.dst_id,
                        voice.slot,
                        voice.stream_id,
                        now,
                    );
                    let slot_bytes = transcode::wire_ambe_to_dmr_slot(&voice.data);
                    let ambe = transcode::dmr_slot_to_ysf_ambe(&slot_bytes);
                    new_call.ysf_frame_buffer.push(ambe);
                    *guard = Some(new_call);
                    self.total_calls.fetch_add(1, Ordering::Relaxed);
                    self.dmr_to_ysf_calls.fetch_add(1, Ordering::Relaxed);
                    if let Some(m) = &self.metrics {
                        m.bridge_calls_total.add(1, &[]);
                    }
                    None
                }
            }
        };

        if let Some((frames, source, frame_no)) = flush {
            self.emit_ysf_packet(&frames, &source, frame_no).await;
        }
    }

    async fn emit_ysf_packet(&self, frames: &[crate::bitcodec::AmbeFrame], source: &str, frame_no: u8) {
        let mut raw = [0u8; DATA_PACKET_LEN];
        raw[0..4].copy_from_slice(b"YSFD");
        pad_into(&mut raw[4..14], &self.config.gateway_callsign);
        pad_into(&mut raw[14..24], source);
        pad_into(&mut raw[24..34], "ALL");
        raw[34] = frame_no;
        for (i, frame) in frames.iter().enumerate().take(voice_layout::VOICE_CHANNELS) {
            voice_layout::write_channel(&mut raw, i, frame);
        }

        let addrs = self.registry.all_addresses();
        self.server.broadcast(&raw, &addrs, None).await;
        for &addr in &addrs {
            self.registry.process_transmit(addr, DATA_PACKET_LEN);
        }
        info!(%source, "bridge: emitted YSFD packet from buffered DMR frames");
    }

    async fn check_hang_time(self: Arc<Self>) {
        let now = Instant::now();
        let ended = {
            let mut guard = self.call.lock().await;
            match guard.as_ref() {
                Some(call) if call.is_expired(now, self.hang_time) => guard.take(),
                _ => None,
            }
        };
        let Some(call) = ended else { return };

        match call.direction {
            BridgeDirection::YsfToDmr => {
                if let Err(e) = self
                    .dmr
                    .send_voice_terminator(
                        call.dmr_id,
                        call.talkgroup,
                        call.slot,
                        CallType::Group,
                        call.stream_id,
                        call.wire_seq(),
                    )
                    .await
                {
                    warn!(error = %e, "bridge: failed to send DMR voice terminator");
                }
                info!(callsign = %call.source_callsign, "bridge: YSF->DMR call ended (hang time)");
            }
            BridgeDirection::DmrToYsf => {
                if !call.ysf_frame_buffer.is_empty() {
                    debug!(
                        dropped = call.ysf_frame_buffer.len(),
                        "bridge: discarding partial DMR->YSF frame buffer on hang-time end"
                    );
                }
                info!(callsign = %call.source_callsign, "bridge: DMR->YSF call ended (hang time)");
            }
        }
    }

    /// Background task ending a call whose `last_activity` has exceeded
    /// `hang_time`, checked once per second.
    pub async fn run_hang_time_monitor(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        loop {
            tokio::select! {
                _ = ticker.tick() => self.clone().check_hang_time().await,
                res = shutdown.changed() => {
                    if res.is_ok() && *shutdown.borrow() {
                        info!("bridge: hang-time monitor stopping");
                        break;
                    }
                }
            }
        }
    }

    /// Background task reading DMR packets until cancellation. Receive
    /// errors that are not cancellation are debug-logged; the loop
    /// continues (§4.7 failure semantics).
    pub async fn run_dmr_reader(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                res = shutdown.changed() => {
                    if res.is_ok() && *shutdown.borrow() {
                        info!("bridge: DMR reader stopping");
                        break;
                    }
                }
                result = self.dmr.receive_packet() => {
                    match result {
                        Ok(DmrPacket::VoiceData(voice)) => self.clone().handle_dmr_voice(voice).await,
                        Ok(DmrPacket::Other) => {}
                        Err(e) => debug!(error = %e, "bridge: DMR network receive error"),
                    }
                }
            }
        }
    }
}

impl BridgeCollaborator for CrossModeBridge {
    fn is_bridge_peer(&self, addr: SocketAddr) -> bool {
        self.virtual_peer_addr == Some(addr)
    }

    fn offer_ysf_frame(&self, raw: &[u8; DATA_PACKET_LEN]) {
        // `offer_ysf_frame` is a synchronous hand-off from the reflector's
        // async data handler; the transcode + DMR send work happens on its
        // own task so the reflector's broadcast path is never blocked on it.
        // `self_weak` lets us re-derive the `Arc` every live instance is
        // held by (constructed exclusively via `new`/`Arc::new_cyclic`)
        // without requiring `offer_ysf_frame` to take `Arc<Self>` through
        // the trait object.
        let Some(this) = self.self_weak.upgrade() else { return };
        let raw = *raw;
        tokio::spawn(async move { this.handle_ysf_frame(raw).await });
    }
}

fn pad_into(dst: &mut [u8], s: &str) {
    dst.fill(b' ');
    let bytes = s.as_bytes();
    let n = bytes.len().min(dst.len());
    dst[..n].copy_from_slice(&bytes[..n]);
}
