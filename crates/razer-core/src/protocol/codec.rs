//! Wire codec: big-endian field conversion and command frame assembly.

use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;

use super::constants::{COMMAND_HDR_SIZE, COMMAND_MAX_SIZE, IDSTR_MAX_SIZE};

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Device identity too long: {actual} bytes, maximum {max}")]
    IdentityTooLong { actual: usize, max: usize },
    #[error("Command payload too large: {actual} bytes do not fit the frame")]
    PayloadTooLarge { actual: usize },
}

/// Decode a big-endian u32 from the first 4 bytes of `buf`.
pub fn be32_to_u32(buf: &[u8]) -> u32 {
    BigEndian::read_u32(buf)
}

/// Decode a big-endian u16 from the first 2 bytes of `buf`.
pub fn be16_to_u16(buf: &[u8]) -> u16 {
    BigEndian::read_u16(buf)
}

/// Encode a u32 as 4 big-endian bytes.
pub fn u32_to_be32(value: u32) -> [u8; 4] {
    let mut buf = [0u8; 4];
    BigEndian::write_u32(&mut buf, value);
    buf
}

/// Encode a u16 as 2 big-endian bytes.
pub fn u16_to_be16(value: u16) -> [u8; 2] {
    let mut buf = [0u8; 2];
    BigEndian::write_u16(&mut buf, value);
    buf
}

/// Assemble a command frame.
///
/// Layout: 1 identifier byte, the device identity zero-padded to 128 bytes,
/// the operation payload, then zero padding up to exactly 512 bytes.
/// Identity and payload are validated before any I/O happens.
pub fn build_command(id: u8, idstr: &str, payload: &[u8]) -> Result<Vec<u8>, CodecError> {
    if idstr.len() > IDSTR_MAX_SIZE {
        return Err(CodecError::IdentityTooLong {
            actual: idstr.len(),
            max: IDSTR_MAX_SIZE,
        });
    }
    if COMMAND_HDR_SIZE + IDSTR_MAX_SIZE + payload.len() > COMMAND_MAX_SIZE {
        return Err(CodecError::PayloadTooLarge {
            actual: payload.len(),
        });
    }

    let mut cmd = Vec::with_capacity(COMMAND_MAX_SIZE);
    cmd.push(id);
    cmd.extend_from_slice(idstr.as_bytes());
    cmd.resize(COMMAND_HDR_SIZE + IDSTR_MAX_SIZE, 0);
    cmd.extend_from_slice(payload);
    cmd.resize(COMMAND_MAX_SIZE, 0);
    Ok(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::constants::COMMAND_ID_GETFWVER;

    #[test]
    fn test_frame_layout() {
        let cmd = build_command(COMMAND_ID_GETFWVER, "Mouse:DeathAdder:USB-1-1:0", b"\x01\x02")
            .unwrap();
        assert_eq!(cmd.len(), COMMAND_MAX_SIZE);
        assert_eq!(cmd[0], COMMAND_ID_GETFWVER);

        // Identity field round-trips by trimming trailing zero padding.
        let idfield = &cmd[COMMAND_HDR_SIZE..COMMAND_HDR_SIZE + IDSTR_MAX_SIZE];
        let end = idfield.iter().position(|&b| b == 0).unwrap();
        assert_eq!(&idfield[..end], b"Mouse:DeathAdder:USB-1-1:0");

        // Payload starts right after the identity field.
        assert_eq!(&cmd[129..131], b"\x01\x02");
        assert!(cmd[131..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_empty_identity_and_payload() {
        let cmd = build_command(0, "", &[]).unwrap();
        assert_eq!(cmd.len(), COMMAND_MAX_SIZE);
        assert!(cmd.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_identity_too_long() {
        let idstr = "x".repeat(IDSTR_MAX_SIZE + 1);
        assert!(matches!(
            build_command(1, &idstr, &[]),
            Err(CodecError::IdentityTooLong { actual: 129, .. })
        ));
    }

    #[test]
    fn test_payload_too_large() {
        let payload = vec![0u8; COMMAND_MAX_SIZE - COMMAND_HDR_SIZE - IDSTR_MAX_SIZE + 1];
        assert!(matches!(
            build_command(1, "", &payload),
            Err(CodecError::PayloadTooLarge { .. })
        ));
        // The largest payload that still fits.
        let payload = vec![0u8; COMMAND_MAX_SIZE - COMMAND_HDR_SIZE - IDSTR_MAX_SIZE];
        assert!(build_command(1, "", &payload).is_ok());
    }

    #[test]
    fn test_be_roundtrip() {
        for value in [0u32, 1, 0xFF, 0xDEAD_BEEF, u32::MAX] {
            assert_eq!(be32_to_u32(&u32_to_be32(value)), value);
        }
        for value in [0u16, 1, 0xBEEF, u16::MAX] {
            assert_eq!(be16_to_u16(&u16_to_be16(value)), value);
        }
        assert_eq!(u32_to_be32(0x0102_0304), [1, 2, 3, 4]);
    }
}
