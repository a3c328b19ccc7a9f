//! Intel-HEX firmware image parsing.
//!
//! Assembles the checksummed, address-tagged text records into one flat
//! byte buffer. Gaps are zero-filled. The overlap guard treats a non-zero
//! destination byte as already written; a legitimate zero data byte that is
//! later overwritten would not trip it. That matches the historical
//! behavior of the format consumers this parser replaces.

use thiserror::Error;

/// Data record.
const TYPE_DATA: u8 = 0;
/// End of file; remaining input is ignored.
const TYPE_EOF: u8 = 1;
/// Extended linear address record; shifts the 16 bit addressing window.
const TYPE_ELAR: u8 = 4;

#[derive(Error, Debug)]
pub enum IhexError {
    #[error("IHEX length error in line {line}")]
    MalformedLength { line: usize },
    #[error("IHEX magic error in line {line}")]
    MalformedMagic { line: usize },
    #[error("IHEX count error in line {line}")]
    MalformedCount { line: usize },
    #[error("IHEX checksum error in line {line}")]
    ChecksumMismatch { line: usize },
    #[error("IHEX invalid extended linear address record in line {line}")]
    MalformedExtendedAddress { line: usize },
    #[error("IHEX double write to address {addr:#08X}")]
    OverlapCorruption { addr: usize },
    #[error("IHEX unsupported record type {rtype} in line {line}")]
    UnsupportedRecordType { rtype: u8, line: usize },
    #[error("IHEX digit format error in line {line}")]
    DigitFormat { line: usize },
}

/// Parse an Intel-HEX text block into a flat byte image.
pub fn parse(data: &[u8]) -> Result<Vec<u8>, IhexError> {
    let mut image: Vec<u8> = Vec::new();
    let mut hi_addr: u32 = 0;

    for (index, raw) in data.split(|&b| b == b'\n').enumerate() {
        let line = index + 1;
        let text = std::str::from_utf8(raw)
            .map_err(|_| IhexError::DigitFormat { line })?
            .trim();
        if text.is_empty() {
            continue;
        }
        if !text.is_ascii() {
            return Err(IhexError::DigitFormat { line });
        }
        if text.len() < 11 || (text.len() - 1) % 2 != 0 {
            return Err(IhexError::MalformedLength { line });
        }
        if !text.starts_with(':') {
            return Err(IhexError::MalformedMagic { line });
        }

        let count = hex_byte(text, 1, line)? as usize;
        if text.len() != count * 2 + 11 {
            return Err(IhexError::MalformedCount { line });
        }
        let addr_hi = hex_byte(text, 3, line)? as u32;
        let addr_lo = hex_byte(text, 5, line)? as u32;
        let addr = (((addr_hi << 8) | addr_lo) | (hi_addr << 16)) as usize;
        let rtype = hex_byte(text, 7, line)?;

        // The record checksum makes every byte of the record, including
        // the trailing checksum byte itself, sum to 0 mod 256.
        let mut checksum: u32 = 0;
        let mut pos = 1;
        while pos < text.len() {
            checksum = (checksum + hex_byte(text, pos, line)? as u32) & 0xFF;
            pos += 2;
        }
        if checksum != 0 {
            return Err(IhexError::ChecksumMismatch { line });
        }

        match rtype {
            TYPE_EOF => break,
            TYPE_ELAR => {
                if count != 2 {
                    return Err(IhexError::MalformedExtendedAddress { line });
                }
                hi_addr = ((hex_byte(text, 9, line)? as u32) << 8)
                    | hex_byte(text, 11, line)? as u32;
            }
            TYPE_DATA => {
                if image.len() < addr + count {
                    image.resize(addr + count, 0);
                }
                for n in 0..count {
                    let byte = hex_byte(text, 9 + n * 2, line)?;
                    if image[addr + n] != 0 {
                        return Err(IhexError::OverlapCorruption { addr: addr + n });
                    }
                    image[addr + n] = byte;
                }
            }
            rtype => return Err(IhexError::UnsupportedRecordType { rtype, line }),
        }
    }

    Ok(image)
}

fn hex_byte(text: &str, pos: usize, line: usize) -> Result<u8, IhexError> {
    u8::from_str_radix(&text[pos..pos + 2], 16).map_err(|_| IhexError::DigitFormat { line })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a valid record with a correct checksum.
    fn record(addr: u16, rtype: u8, data: &[u8]) -> String {
        let mut sum = data.len() as u32 + (addr >> 8) as u32 + (addr & 0xFF) as u32 + rtype as u32;
        let mut line = format!(":{:02X}{:04X}{:02X}", data.len(), addr, rtype);
        for &byte in data {
            sum += byte as u32;
            line.push_str(&format!("{byte:02X}"));
        }
        line.push_str(&format!("{:02X}", (0x100 - (sum & 0xFF)) & 0xFF));
        line
    }

    fn eof() -> String {
        ":00000001FF".to_string()
    }

    #[test]
    fn test_simple_image() {
        let input = format!(
            "{}\n{}\n{}\n",
            record(0x0000, 0, &[0x11, 0x22]),
            record(0x0004, 0, &[0x33]),
            eof()
        );
        let image = parse(input.as_bytes()).unwrap();
        assert_eq!(image, vec![0x11, 0x22, 0, 0, 0x33]);
    }

    #[test]
    fn test_gap_is_zero_filled() {
        let input = format!("{}\n{}\n", record(0x0002, 0, &[0xAA]), eof());
        assert_eq!(parse(input.as_bytes()).unwrap(), vec![0, 0, 0xAA]);
    }

    #[test]
    fn test_lines_after_eof_are_ignored() {
        let input = format!("{}\n{}\nnot a record at all\n", record(0, 0, &[0x01]), eof());
        assert_eq!(parse(input.as_bytes()).unwrap(), vec![0x01]);
    }

    #[test]
    fn test_extended_linear_address() {
        // Window 0x0001, then one byte at offset 0x0010 lands at 0x10010.
        let input = format!(
            "{}\n{}\n{}\n",
            record(0x0000, 4, &[0x00, 0x01]),
            record(0x0010, 0, &[0xAB]),
            eof()
        );
        let image = parse(input.as_bytes()).unwrap();
        assert_eq!(image.len(), 0x10011);
        assert_eq!(image[0x10010], 0xAB);
        assert_eq!(image[0x0010], 0x00);
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut line = record(0, 0, &[0x42]);
        // Corrupt the trailing checksum byte.
        line.replace_range(line.len() - 2.., "00");
        assert!(matches!(
            parse(line.as_bytes()),
            Err(IhexError::ChecksumMismatch { line: 1 })
        ));
    }

    #[test]
    fn test_overlap_detection() {
        let input = format!(
            "{}\n{}\n{}\n",
            record(0x0000, 0, &[0x42]),
            record(0x0000, 0, &[0x43]),
            eof()
        );
        assert!(matches!(
            parse(input.as_bytes()),
            Err(IhexError::OverlapCorruption { addr: 0 })
        ));
    }

    #[test]
    fn test_malformed_magic() {
        assert!(matches!(
            parse(b"x00000001FF"),
            Err(IhexError::MalformedMagic { line: 1 })
        ));
    }

    #[test]
    fn test_malformed_length() {
        assert!(matches!(
            parse(b":0000"),
            Err(IhexError::MalformedLength { line: 1 })
        ));
        // Even length after the marker is also rejected.
        assert!(matches!(
            parse(b":00000001FF0"),
            Err(IhexError::MalformedLength { line: 1 })
        ));
    }

    #[test]
    fn test_malformed_count() {
        // Count claims 2 data bytes but only one is present.
        let input = ":02000000AAAB";
        assert!(matches!(
            parse(input.as_bytes()),
            Err(IhexError::MalformedCount { line: 1 })
        ));
    }

    #[test]
    fn test_malformed_elar() {
        let input = record(0, 4, &[0x01]);
        assert!(matches!(
            parse(input.as_bytes()),
            Err(IhexError::MalformedExtendedAddress { line: 1 })
        ));
    }

    #[test]
    fn test_unsupported_record_type() {
        let input = record(0, 3, &[0x00, 0x00, 0x00, 0x00]);
        assert!(matches!(
            parse(input.as_bytes()),
            Err(IhexError::UnsupportedRecordType { rtype: 3, line: 1 })
        ));
    }

    #[test]
    fn test_digit_format_error() {
        assert!(matches!(
            parse(b":0G000001FF"),
            Err(IhexError::DigitFormat { line: 1 })
        ));
    }

    #[test]
    fn test_blank_lines_and_crlf() {
        let input = format!("\n  {}  \r\n\n{}\r\n", record(0, 0, &[0x7F]), eof());
        assert_eq!(parse(input.as_bytes()).unwrap(), vec![0x7F]);
    }
}
