mod packet;
mod sanitize;

pub use packet::{
    build_poll, build_status_request, build_status_response, build_unlink, data_dest_callsign,
    data_frame_counter, data_gateway_callsign, data_sequence_number, data_source_callsign,
    data_voice_region, fold_hash, parse, Packet, PacketType, DATA_PACKET_LEN,
    STATUS_RESPONSE_LEN, UNLINK_PACKET_LEN,
};
pub use sanitize::{sanitize_callsign, sanitize_data_packet};

use thiserror::Error;

/// Wire-codec parse failures. All are recoverable at the call site:
/// drop the packet and log at debug level.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    #[error("packet shorter than the 4-byte type tag")]
    TooShort,
    #[error("unrecognized 4-byte packet type")]
    UnknownType,
    #[error("packet size does not match its type")]
    WrongSizeForType,
    #[error("packet type is recognized but not supported")]
    UnsupportedType,
}
