use super::tables::PN9_SEQUENCE;

/// XORs `data` against the 20-byte PN9 sequence, MSB-first, cycling. The
/// same operation scrambles and descrambles.
pub fn pn9_xor(data: &[u8]) -> Vec<u8> {
    data.iter()
        .enumerate()
        .map(|(i, &b)| b ^ PN9_SEQUENCE[i % PN9_SEQUENCE.len()])
        .collect()
}

pub fn scramble_dmr(data: &[u8]) -> Vec<u8> {
    pn9_xor(data)
}

pub fn descramble_ysf(data: &[u8]) -> Vec<u8> {
    pn9_xor(data)
}
