use std::time::Instant;

use crate::bitcodec::AmbeFrame;

/// The direction of the single in-flight bridge call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeDirection {
    YsfToDmr,
    DmrToYsf,
}

/// The bridge's one-and-only in-flight call. A packet from the opposing
/// direction while this is `Some` is dropped, not queued (§3 invariant).
pub struct CallState {
    pub direction: BridgeDirection,
    pub source_callsign: String,
    pub dmr_id: u32,
    pub talkgroup: u32,
    pub slot: u8,
    pub stream_id: u32,
    pub start: Instant,
    pub last_activity: Instant,
    /// Monotonic per call; wraps mod 256 when encoded on the wire.
    pub frame_count: u32,
    /// DMR->YSF only: frames accumulated toward the next 155-byte YSFD
    /// packet. Capacity 5; flushed (and discarded if partial) on call end.
    pub ysf_frame_buffer: Vec<AmbeFrame>,
}

impl CallState {
    pub fn new(
        direction: BridgeDirection,
        source_callsign: String,
        dmr_id: u32,
        talkgroup: u32,
        slot: u8,
        stream_id: u32,
        now: Instant,
    ) -> Self {
        Self {
            direction,
            source_callsign,
            dmr_id,
            talkgroup,
            slot,
            stream_id,
            start: now,
            last_activity: now,
            frame_count: 0,
            ysf_frame_buffer: Vec::with_capacity(5),
        }
    }

    pub fn wire_seq(&self) -> u8 {
        (self.frame_count % 256) as u8
    }

    pub fn touch(&mut self, now: Instant) {
        self.last_activity = now;
        self.frame_count += 1;
    }

    /// Reserves `count` sequential wire sequence numbers (one per DMR voice
    /// frame packed into a single YSFD super-frame) and refreshes
    /// `last_activity` once for the whole batch.
    pub fn next_seqs(&mut self, now: Instant, count: usize) -> Vec<u8> {
        self.last_activity = now;
        (0..count)
            .map(|_| {
                let seq = self.wire_seq();
                self.frame_count = self.frame_count.wrapping_add(1);
                seq
            })
            .collect()
    }

    pub fn is_expired(&self, now: Instant, hang_time: std::time::Duration) -> bool {
        now.duration_since(self.last_activity) > hang_time
    }
}
