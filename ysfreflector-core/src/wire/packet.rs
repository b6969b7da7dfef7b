use super::ParseError;

pub const POLL_PACKET_LEN: usize = 14;
pub const UNLINK_PACKET_LEN: usize = 14;
pub const DATA_PACKET_LEN: usize = 155;
pub const STATUS_REQUEST_SHORT_LEN: usize = 4;
pub const STATUS_REQUEST_LONG_LEN: usize = 14;
pub const STATUS_RESPONSE_LEN: usize = 42;

const TAG_POLL: &[u8; 4] = b"YSFP";
const TAG_DATA: &[u8; 4] = b"YSFD";
const TAG_UNLINK: &[u8; 4] = b"YSFU";
const TAG_STATUS: &[u8; 4] = b"YSFS";
const TAG_ADVISORY_OUT: &[u8; 4] = b"YSFO";
const TAG_ADVISORY_IN: &[u8; 4] = b"YSFI";

/// The four-byte tag that opens every YSF packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    Poll,
    Data,
    Unlink,
    StatusRequest,
    StatusResponse,
    Advisory,
}

impl PacketType {
    pub fn tag(self) -> &'static [u8; 4] {
        match self {
            PacketType::Poll => TAG_POLL,
            PacketType::Data => TAG_DATA,
            PacketType::Unlink => TAG_UNLINK,
            PacketType::StatusRequest | PacketType::StatusResponse => TAG_STATUS,
            PacketType::Advisory => TAG_ADVISORY_OUT,
        }
    }
}

/// A parsed YSF packet. Holds the raw bytes plus enough structure to dispatch
/// on; field accessors below index into the original buffer rather than
/// copying it out eagerly.
#[derive(Debug, Clone)]
pub enum Packet {
    Poll { callsign: [u8; 10] },
    Data { raw: [u8; DATA_PACKET_LEN] },
    Unlink { callsign: [u8; 10] },
    StatusRequest,
    StatusResponse { hash: [u8; 5], name: [u8; 16], description: [u8; 14], count: [u8; 3] },
    Advisory,
}

impl Packet {
    pub fn packet_type(&self) -> PacketType {
        match self {
            Packet::Poll { .. } => PacketType::Poll,
            Packet::Data { .. } => PacketType::Data,
            Packet::Unlink { .. } => PacketType::Unlink,
            Packet::StatusRequest => PacketType::StatusRequest,
            Packet::StatusResponse { .. } => PacketType::StatusResponse,
            Packet::Advisory => PacketType::Advisory,
        }
    }
}

/// Parses a raw datagram into a `Packet`, validating its size contract.
pub fn parse(buf: &[u8]) -> Result<Packet, ParseError> {
    if buf.len() < 4 {
        return Err(ParseError::TooShort);
    }
    let tag: [u8; 4] = buf[0..4].try_into().expect("checked len");

    match &tag {
        TAG_POLL => {
            if buf.len() != POLL_PACKET_LEN {
                return Err(ParseError::WrongSizeForType);
            }
            let mut callsign = [0u8; 10];
            callsign.copy_from_slice(&buf[4..14]);
            Ok(Packet::Poll { callsign })
        }
        TAG_UNLINK => {
            if buf.len() != UNLINK_PACKET_LEN {
                return Err(ParseError::WrongSizeForType);
            }
            let mut callsign = [0u8; 10];
            callsign.copy_from_slice(&buf[4..14]);
            Ok(Packet::Unlink { callsign })
        }
        TAG_DATA => {
            if buf.len() != DATA_PACKET_LEN {
                return Err(ParseError::WrongSizeForType);
            }
            let mut raw = [0u8; DATA_PACKET_LEN];
            raw.copy_from_slice(buf);
            Ok(Packet::Data { raw })
        }
        TAG_STATUS => match buf.len() {
            STATUS_REQUEST_SHORT_LEN | STATUS_REQUEST_LONG_LEN => Ok(Packet::StatusRequest),
            STATUS_RESPONSE_LEN => {
                let mut hash = [0u8; 5];
                hash.copy_from_slice(&buf[4..9]);
                let mut name = [0u8; 16];
                name.copy_from_slice(&buf[9..25]);
                let mut description = [0u8; 14];
                description.copy_from_slice(&buf[25..39]);
                let mut count = [0u8; 3];
                count.copy_from_slice(&buf[39..42]);
                Ok(Packet::StatusResponse { hash, name, description, count })
            }
            _ => Err(ParseError::WrongSizeForType),
        },
        TAG_ADVISORY_OUT | TAG_ADVISORY_IN => Ok(Packet::Advisory),
        _ => Err(ParseError::UnknownType),
    }
}

/// The gateway callsign field of a data packet, bytes `[4..14)`.
pub fn data_gateway_callsign(raw: &[u8; DATA_PACKET_LEN]) -> &[u8] {
    &raw[4..14]
}

/// The source callsign field of a data packet, bytes `[14..24)`.
pub fn data_source_callsign(raw: &[u8; DATA_PACKET_LEN]) -> &[u8] {
    &raw[14..24]
}

/// The destination callsign field of a data packet, bytes `[24..34)`.
pub fn data_dest_callsign(raw: &[u8; DATA_PACKET_LEN]) -> &[u8] {
    &raw[24..34]
}

/// The 8-bit monotonic frame counter at byte `[34]`.
pub fn data_frame_counter(raw: &[u8; DATA_PACKET_LEN]) -> u8 {
    raw[34]
}

/// The FICH + voice-channel payload, bytes `[35..155)`.
pub fn data_voice_region(raw: &[u8; DATA_PACKET_LEN]) -> &[u8] {
    &raw[35..155]
}

/// The big-endian word at `[14..18)`, used only for log/trace correlation
/// This overlaps the first four bytes of the source-callsign field;
/// the registry never gates on this value.
pub fn data_sequence_number(raw: &[u8; DATA_PACKET_LEN]) -> u32 {
    u32::from_be_bytes(raw[14..18].try_into().expect("fixed slice"))
}

fn pad(dst: &mut [u8], src: &str) {
    dst.fill(b' ');
    let bytes = src.as_bytes();
    let n = bytes.len().min(dst.len());
    dst[..n].copy_from_slice(&bytes[..n]);
}

pub fn build_poll(callsign: &str) -> [u8; POLL_PACKET_LEN] {
    let mut out = [0u8; POLL_PACKET_LEN];
    out[0..4].copy_from_slice(TAG_POLL);
    pad(&mut out[4..14], callsign);
    out
}

pub fn build_unlink(callsign: &str) -> [u8; UNLINK_PACKET_LEN] {
    let mut out = [0u8; UNLINK_PACKET_LEN];
    out[0..4].copy_from_slice(TAG_UNLINK);
    pad(&mut out[4..14], callsign);
    out
}

pub fn build_status_request() -> [u8; STATUS_REQUEST_SHORT_LEN] {
    *TAG_STATUS
}

/// Builds a 42-byte status response.
pub fn build_status_response(name: &str, description: &str, count: u16) -> [u8; STATUS_RESPONSE_LEN] {
    let mut out = [0u8; STATUS_RESPONSE_LEN];
    out[0..4].copy_from_slice(TAG_STATUS);
    let hash = fold_hash(name);
    out[4..9].copy_from_slice(format!("{hash:05}").as_bytes());
    pad(&mut out[9..25], name);
    pad(&mut out[25..39], description);
    out[39..42].copy_from_slice(format!("{:03}", count.min(999)).as_bytes());
    out
}

/// Deterministic fold hash over a name string. Not a security
/// primitive — used only to give status responses a short, stable tag.
pub fn fold_hash(s: &str) -> u32 {
    let mut h: u64 = 0;
    for b in s.bytes() {
        h = h.wrapping_mul(31).wrapping_add(b as u64);
    }
    (h % 100_000) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_poll() {
        let mut buf = Vec::from(*b"YSFP");
        buf.extend_from_slice(b"TEST      ");
        let pkt = parse(&buf).expect("parse");
        assert_eq!(pkt.packet_type(), PacketType::Poll);
    }

    #[test]
    fn rejects_too_short() {
        assert_eq!(parse(b"YS").unwrap_err(), ParseError::TooShort);
    }

    #[test]
    fn rejects_unknown_type() {
        let mut buf = Vec::from(*b"ZZZZ");
        buf.extend_from_slice(b"TEST      ");
        assert_eq!(parse(&buf).unwrap_err(), ParseError::UnknownType);
    }

    #[test]
    fn rejects_wrong_size() {
        let buf = Vec::from(*b"YSFP");
        assert_eq!(parse(&buf).unwrap_err(), ParseError::WrongSizeForType);
    }

    #[test]
    fn status_request_accepts_both_forms() {
        assert!(parse(b"YSFS").is_ok());
        let mut long = Vec::from(*b"YSFS");
        long.extend_from_slice(b"          ");
        assert!(parse(&long).is_ok());
    }

    #[test]
    fn status_response_round_trip() {
        let resp = build_status_response("E2E-TEST", "E2E Descript", 1);
        assert_eq!(resp.len(), STATUS_RESPONSE_LEN);
        let pkt = parse(&resp).expect("parse");
        match pkt {
            Packet::StatusResponse { name, description, count, .. } => {
                assert_eq!(std::str::from_utf8(&name).unwrap().trim_end(), "E2E-TEST");
                assert_eq!(
                    std::str::from_utf8(&description).unwrap().trim_end(),
                    "E2E Descript"
                );
                assert_eq!(std::str::from_utf8(&count).unwrap(), "001");
            }
            _ => panic!("expected status response"),
        }
    }

    #[test]
    fn advisory_types_accepted_and_ignored() {
        assert_eq!(parse(b"YSFO").unwrap().packet_type(), PacketType::Advisory);
        assert_eq!(parse(b"YSFIxxxx").unwrap().packet_type(), PacketType::Advisory);
    }

    #[test]
    fn poll_echo_matches_scenario_one() {
        let resp = build_poll("REFLECTOR");
        assert_eq!(&resp[0..4], b"YSFP");
        assert_eq!(&resp[4..14], b"REFLECTOR ");
    }
}
