//! Maps AMBE frames into and out of a YSFD packet's voice region.
//!
//! spec.md §4.1 describes the region at bytes `[35..155)` as "120 bytes of
//! FICH + 5 voice channels" without pinning down the exact per-channel byte
//! split (that level of on-air framing detail is out of scope — §1 excludes
//! AMBE vocoder decoding and this bridge never inspects FICH content). We
//! divide the 120 bytes into 5 equal 24-byte channels; the interleaved
//! 104-bit (13-byte) YSF voice block for a channel lives at its start, and
//! the remaining 11 bytes (FICH share / reserved) are left zeroed on
//! bridge-synthesized packets.

use crate::bitcodec::{deinterleave_ysf, interleave_ysf, AmbeFrame, AMBE_BITS, YSF_FRAME_BITS};
use crate::wire::DATA_PACKET_LEN;

pub const VOICE_CHANNELS: usize = 5;
const VOICE_REGION_START: usize = 35;
const VOICE_REGION_LEN: usize = DATA_PACKET_LEN - VOICE_REGION_START;
const CHANNEL_BYTES: usize = VOICE_REGION_LEN / VOICE_CHANNELS;
const INTERLEAVED_BYTES: usize = YSF_FRAME_BITS / 8;

fn channel_offset(channel: usize) -> usize {
    VOICE_REGION_START + channel * CHANNEL_BYTES
}

/// Reads the AMBE frame carried by voice channel `channel` (0..5) of a YSFD
/// packet, undoing the YSF interleave.
pub fn read_channel(raw: &[u8; DATA_PACKET_LEN], channel: usize) -> AmbeFrame {
    debug_assert!(channel < VOICE_CHANNELS);
    let start = channel_offset(channel);
    let mut bits = [false; YSF_FRAME_BITS];
    for (i, slot) in bits.iter_mut().enumerate() {
        let byte = raw[start + i / 8];
        *slot = byte & (0x80 >> (i % 8)) != 0;
    }
    let deinterleaved = deinterleave_ysf(&bits);
    let mut ambe_bits = [false; AMBE_BITS];
    ambe_bits.copy_from_slice(&deinterleaved[..AMBE_BITS]);
    AmbeFrame::from_bits(ambe_bits)
}

/// Writes `frame`, YSF-interleaved, into voice channel `channel` of `raw`.
/// Only the channel's leading `104` bits are touched; the FICH/reserved
/// tail of the channel is left as-is.
pub fn write_channel(raw: &mut [u8; DATA_PACKET_LEN], channel: usize, frame: &AmbeFrame) {
    debug_assert!(channel < VOICE_CHANNELS);
    let mut bits = [false; YSF_FRAME_BITS];
    bits[..AMBE_BITS].copy_from_slice(frame.bits());
    let interleaved = interleave_ysf(&bits);

    let start = channel_offset(channel);
    let mut packed = [0u8; INTERLEAVED_BYTES];
    for (i, &bit) in interleaved.iter().enumerate() {
        if bit {
            packed[i / 8] |= 0x80 >> (i % 8);
        }
    }
    raw[start..start + INTERLEAVED_BYTES].copy_from_slice(&packed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_recovers_the_frame() {
        let mut bits = [false; AMBE_BITS];
        for (i, b) in bits.iter_mut().enumerate() {
            *b = i % 4 == 0;
        }
        let frame = AmbeFrame::from_bits(bits);

        let mut raw = [0u8; DATA_PACKET_LEN];
        raw[0..4].copy_from_slice(b"YSFD");
        write_channel(&mut raw, 2, &frame);
        let round = read_channel(&raw, 2);
        assert_eq!(round, frame);
    }

    #[test]
    fn channels_do_not_overlap() {
        let frame_a = AmbeFrame::from_bits([true; AMBE_BITS]);
        let frame_b = AmbeFrame::from_bits([false; AMBE_BITS]);
        let mut raw = [0u8; DATA_PACKET_LEN];
        write_channel(&mut raw, 0, &frame_a);
        write_channel(&mut raw, 1, &frame_b);
        assert_eq!(read_channel(&raw, 0), frame_a);
        assert_eq!(read_channel(&raw, 1), frame_b);
    }
}
