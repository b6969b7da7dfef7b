use super::tables::{
    DMR_TABLE_A, DMR_TABLE_B, DMR_TABLE_C, YSF_FRAME_BITS, YSF_INTERLEAVE_TABLE,
};

/// The three DMR burst frame types; each owns a disjoint subset of the
/// 72-bit slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmrFrameType {
    A,
    B,
    C,
}

impl DmrFrameType {
    fn table(self) -> &'static [usize] {
        match self {
            DmrFrameType::A => &DMR_TABLE_A,
            DmrFrameType::B => &DMR_TABLE_B,
            DmrFrameType::C => &DMR_TABLE_C,
        }
    }
}

/// `out[table[i]] <- in[i]`, for the 104-bit YSF voice interleaver.
pub fn interleave_ysf(bits: &[bool; YSF_FRAME_BITS]) -> [bool; YSF_FRAME_BITS] {
    let mut out = [false; YSF_FRAME_BITS];
    for (i, &b) in bits.iter().enumerate() {
        out[YSF_INTERLEAVE_TABLE[i]] = b;
    }
    out
}

/// `out[i] <- in[table[i]]`, the exact inverse of `interleave_ysf`.
pub fn deinterleave_ysf(bits: &[bool; YSF_FRAME_BITS]) -> [bool; YSF_FRAME_BITS] {
    let mut out = [false; YSF_FRAME_BITS];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = bits[YSF_INTERLEAVE_TABLE[i]];
    }
    out
}

/// Scatters `bits` into a fresh 72-bit DMR slot at the frame type's table
/// positions; positions outside the table are zeroed.
pub fn interleave_dmr(frame_type: DmrFrameType, bits: &[bool]) -> [bool; 72] {
    let table = frame_type.table();
    let mut out = [false; 72];
    for (i, &pos) in table.iter().enumerate() {
        if let Some(&b) = bits.get(i) {
            out[pos] = b;
        }
    }
    out
}

/// Gathers the frame type's positions back out of a 72-bit DMR slot.
pub fn deinterleave_dmr(frame_type: DmrFrameType, frame: &[bool; 72]) -> Vec<bool> {
    frame_type.table().iter().map(|&pos| frame[pos]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern() -> [bool; YSF_FRAME_BITS] {
        let mut bits = [false; YSF_FRAME_BITS];
        for (i, b) in bits.iter_mut().enumerate() {
            *b = i % 3 == 0;
        }
        bits
    }

    #[test]
    fn ysf_interleave_round_trips() {
        let bits = pattern();
        let round = deinterleave_ysf(&interleave_ysf(&bits));
        assert_eq!(round, bits);
    }

    #[test]
    fn dmr_round_trip_is_not_an_identity() {
        let mut frame = [false; 72];
        for (i, b) in frame.iter_mut().enumerate() {
            *b = i % 2 == 0;
        }
        let extracted = deinterleave_dmr(DmrFrameType::A, &frame);
        let reinterleaved = interleave_dmr(DmrFrameType::A, &extracted);
        assert_ne!(reinterleaved.to_vec(), frame.to_vec());
    }

    #[test]
    fn dmr_tables_have_specified_sizes() {
        assert_eq!(DmrFrameType::A.table().len(), 24);
        assert_eq!(DmrFrameType::B.table().len(), 23);
        assert_eq!(DmrFrameType::C.table().len(), 25);
    }
}
