mod ambe;
mod golay;
mod interleave;
mod pn9;
mod tables;

pub use ambe::{AmbeFrame, AMBE_BITS, AMBE_BYTES};
pub use golay::{decode as golay_decode, encode as golay_encode, encode_base_23_12};
pub use interleave::{
    deinterleave_dmr, deinterleave_ysf, interleave_dmr, interleave_ysf, DmrFrameType,
};
pub use pn9::{descramble_ysf, pn9_xor, scramble_dmr};
pub use tables::YSF_FRAME_BITS;
