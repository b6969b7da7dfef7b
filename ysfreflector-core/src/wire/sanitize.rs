use super::packet::{Packet, DATA_PACKET_LEN};

/// Canonicalizes a callsign: trims ASCII whitespace and NULs, uppercases,
/// then truncates at the first `-`, `/`, or space.
pub fn sanitize_callsign(raw: &[u8]) -> String {
    let trimmed = raw
        .iter()
        .take_while(|&&b| b != 0)
        .copied()
        .collect::<Vec<u8>>();
    let s = String::from_utf8_lossy(&trimmed);
    let s = s.trim_matches(|c: char| c.is_ascii_whitespace() || c == '\0');
    let upper = s.to_ascii_uppercase();
    let end = upper.find(['-', '/', ' ']).unwrap_or(upper.len());
    upper[..end].to_string()
}

fn write_padded(dst: &mut [u8], value: &str) {
    dst.fill(b' ');
    let bytes = value.as_bytes();
    let n = bytes.len().min(dst.len());
    dst[..n].copy_from_slice(&bytes[..n]);
}

/// Rewrites the three callsign fields of a YSFD packet in place with
/// sanitized, right-space-padded values. Non-data packets pass through
/// unchanged.
pub fn sanitize_data_packet(packet: &mut Packet) {
    if let Packet::Data { raw } = packet {
        sanitize_data_raw(raw);
    }
}

fn sanitize_data_raw(raw: &mut [u8; DATA_PACKET_LEN]) {
    let gateway = sanitize_callsign(&raw[4..14]);
    let source = sanitize_callsign(&raw[14..24]);
    let dest = sanitize_callsign(&raw[24..34]);
    write_padded(&mut raw[4..14], &gateway);
    write_padded(&mut raw[14..24], &source);
    write_padded(&mut raw[24..34], &dest);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_trims_truncates_uppercases() {
        assert_eq!(sanitize_callsign(b"kf8s-dave "), "KF8S");
        assert_eq!(sanitize_callsign(b"n0call/p  "), "N0CALL");
        assert_eq!(sanitize_callsign(b"  w1aw    "), "W1AW");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let inputs: &[&[u8]] = &[b"kf8s-dave ", b"N0CALL    ", b"  w1aw/m  ", b"\0\0\0\0\0\0\0\0\0\0"];
        for input in inputs {
            let once = sanitize_callsign(input);
            let twice = sanitize_callsign(once.as_bytes());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn sanitize_data_packet_rewrites_all_three_fields() {
        let mut raw = [b' '; DATA_PACKET_LEN];
        raw[0..4].copy_from_slice(b"YSFD");
        raw[4..14].copy_from_slice(b"gate-way  ");
        raw[14..24].copy_from_slice(b"kf8s-dave ");
        raw[24..34].copy_from_slice(b"all       ");
        let mut pkt = Packet::Data { raw };
        sanitize_data_packet(&mut pkt);
        match pkt {
            Packet::Data { raw } => {
                assert_eq!(&raw[4..14], b"GATE      ");
                assert_eq!(&raw[14..24], b"KF8S      ");
                assert_eq!(&raw[24..34], b"ALL       ");
            }
            _ => unreachable!(),
        }
    }
}
