//! Protocol module containing the event types and the JSON codec.

pub mod codec;
pub mod messages;

pub use codec::{decode_event, encode_broadcast, encode_packet, from_object, CodecError};
pub use messages::*;
