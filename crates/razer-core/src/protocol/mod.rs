//! Protocol module - razerd wire protocol definitions.

pub mod codec;
pub mod constants;
pub mod message;

pub use codec::CodecError;
pub use message::{Message, Notification, ProtocolError, StringEncoding};
