//! Typed reply decoding.
//!
//! razerd multiplexes replies and asynchronous notifications on one stream.
//! Every message starts with one identifier byte; identifiers below 128 are
//! replies with a typed body, identifiers from 128 up are payload-less
//! notifications.

use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;

use super::constants::{
    NOTIFY_ID_DELMOUSE, NOTIFY_ID_NEWMOUSE, REPLY_ID_STR, REPLY_ID_U32, STRING_ENC_ASCII,
    STRING_ENC_UTF8, STRING_ENC_UTF16BE,
};
use crate::transport::{Channel, TransportError};

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Received invalid string encoding {0}")]
    InvalidEncoding(u8),
    #[error("Received unknown message (id={0})")]
    UnknownMessage(u8),
    #[error("Received malformed string payload for encoding {encoding}")]
    MalformedString { encoding: StringEncoding },
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// String payload encodings used by razerd.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringEncoding {
    Ascii,
    Utf8,
    Utf16Be,
}

impl StringEncoding {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            STRING_ENC_ASCII => Some(Self::Ascii),
            STRING_ENC_UTF8 => Some(Self::Utf8),
            STRING_ENC_UTF16BE => Some(Self::Utf16Be),
            _ => None,
        }
    }
}

impl std::fmt::Display for StringEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StringEncoding::Ascii => write!(f, "ASCII"),
            StringEncoding::Utf8 => write!(f, "UTF-8"),
            StringEncoding::Utf16Be => write!(f, "UTF-16BE"),
        }
    }
}

/// Asynchronous daemon-to-client notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// A new mouse was connected.
    NewMouse,
    /// A mouse was removed.
    DelMouse,
}

impl Notification {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            NOTIFY_ID_NEWMOUSE => Some(Self::NewMouse),
            NOTIFY_ID_DELMOUSE => Some(Self::DelMouse),
            _ => None,
        }
    }

    pub fn id(&self) -> u8 {
        match self {
            Self::NewMouse => NOTIFY_ID_NEWMOUSE,
            Self::DelMouse => NOTIFY_ID_DELMOUSE,
        }
    }
}

/// One decoded message off the reply channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    U32(u32),
    Str(String),
    Notification(Notification),
}

impl Message {
    /// Wire identifier of this message.
    pub fn id(&self) -> u8 {
        match self {
            Message::U32(_) => REPLY_ID_U32,
            Message::Str(_) => REPLY_ID_STR,
            Message::Notification(n) => n.id(),
        }
    }
}

/// Read one complete message off the channel.
///
/// Blocks until the full message arrived. A channel closed mid-message
/// surfaces as a transport error.
pub fn read_message<C: Channel + ?Sized>(chan: &mut C) -> Result<Message, ProtocolError> {
    let mut hdr = [0u8; 1];
    chan.recv_exact(&mut hdr)?;

    match hdr[0] {
        REPLY_ID_U32 => {
            let mut buf = [0u8; 4];
            chan.recv_exact(&mut buf)?;
            Ok(Message::U32(BigEndian::read_u32(&buf)))
        }
        REPLY_ID_STR => {
            let mut enc = [0u8; 1];
            chan.recv_exact(&mut enc)?;
            let encoding =
                StringEncoding::from_id(enc[0]).ok_or(ProtocolError::InvalidEncoding(enc[0]))?;

            // The length field counts characters. UTF-16BE doubles the
            // byte count; ASCII and UTF-8 are transferred byte per char.
            let mut lenbuf = [0u8; 2];
            chan.recv_exact(&mut lenbuf)?;
            let strlen = BigEndian::read_u16(&lenbuf) as usize;
            let nrbytes = match encoding {
                StringEncoding::Ascii | StringEncoding::Utf8 => strlen,
                StringEncoding::Utf16Be => strlen * 2,
            };

            let mut payload = vec![0u8; nrbytes];
            chan.recv_exact(&mut payload)?;
            Ok(Message::Str(decode_string(encoding, &payload)?))
        }
        id => match Notification::from_id(id) {
            // Notifications carry no payload.
            Some(notification) => Ok(Message::Notification(notification)),
            None => Err(ProtocolError::UnknownMessage(id)),
        },
    }
}

fn decode_string(encoding: StringEncoding, payload: &[u8]) -> Result<String, ProtocolError> {
    match encoding {
        StringEncoding::Ascii | StringEncoding::Utf8 => String::from_utf8(payload.to_vec())
            .map_err(|_| ProtocolError::MalformedString { encoding }),
        StringEncoding::Utf16Be => {
            let units: Vec<u16> = payload
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16(&units).map_err(|_| ProtocolError::MalformedString { encoding })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockChannel;

    #[test]
    fn test_read_u32() {
        let mut chan = MockChannel::new();
        chan.queue_bytes(&[REPLY_ID_U32, 0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(read_message(&mut chan).unwrap(), Message::U32(0xDEAD_BEEF));
    }

    #[test]
    fn test_read_ascii_string() {
        let mut chan = MockChannel::new();
        chan.queue_bytes(&[REPLY_ID_STR, STRING_ENC_ASCII, 0, 5]);
        chan.queue_bytes(b"Basic");
        assert_eq!(
            read_message(&mut chan).unwrap(),
            Message::Str("Basic".to_string())
        );
    }

    #[test]
    fn test_read_utf16be_string() {
        // 3 characters, 6 payload bytes.
        let mut chan = MockChannel::new();
        chan.queue_bytes(&[REPLY_ID_STR, STRING_ENC_UTF16BE, 0, 3]);
        chan.queue_bytes(&[0x00, b'a', 0x00, b'b', 0x20, 0xAC]);
        assert_eq!(
            read_message(&mut chan).unwrap(),
            Message::Str("ab\u{20ac}".to_string())
        );
    }

    #[test]
    fn test_read_empty_string() {
        let mut chan = MockChannel::new();
        chan.queue_bytes(&[REPLY_ID_STR, STRING_ENC_UTF8, 0, 0]);
        assert_eq!(read_message(&mut chan).unwrap(), Message::Str(String::new()));
    }

    #[test]
    fn test_invalid_encoding() {
        let mut chan = MockChannel::new();
        chan.queue_bytes(&[REPLY_ID_STR, 99, 0, 1, b'x']);
        assert!(matches!(
            read_message(&mut chan),
            Err(ProtocolError::InvalidEncoding(99))
        ));
    }

    #[test]
    fn test_notification_has_no_payload() {
        let mut chan = MockChannel::new();
        chan.queue_bytes(&[NOTIFY_ID_NEWMOUSE, NOTIFY_ID_DELMOUSE]);
        assert_eq!(
            read_message(&mut chan).unwrap(),
            Message::Notification(Notification::NewMouse)
        );
        assert_eq!(
            read_message(&mut chan).unwrap(),
            Message::Notification(Notification::DelMouse)
        );
    }

    #[test]
    fn test_unknown_message() {
        let mut chan = MockChannel::new();
        chan.queue_bytes(&[42]);
        assert!(matches!(
            read_message(&mut chan),
            Err(ProtocolError::UnknownMessage(42))
        ));
    }

    #[test]
    fn test_truncated_message_is_transport_error() {
        let mut chan = MockChannel::new();
        chan.queue_bytes(&[REPLY_ID_U32, 0xDE]);
        assert!(matches!(
            read_message(&mut chan),
            Err(ProtocolError::Transport(_))
        ));
    }
}
