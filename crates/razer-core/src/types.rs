//! Value objects exchanged with the daemon.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::constants::{
    AXIS_FLAG_INDEPENDENT_DPIMAPPING, ERR_CLAIM, ERR_CMDSIZE, ERR_FAIL, ERR_NOLED, ERR_NOMEM,
    ERR_NOMOUSE, ERR_NONE, ERR_NOTSUPP, ERR_PAYLOAD, LED_FLAG_CHANGECOLOR, LED_FLAG_HAVECOLOR,
    NR_AXES,
};

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Decode from the 0x00RRGGBB wire representation.
    pub fn from_u32(value: u32) -> Self {
        Self {
            r: (value >> 16) as u8,
            g: (value >> 8) as u8,
            b: value as u8,
        }
    }

    /// Encode to the 0x00RRGGBB wire representation.
    pub fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }
}

#[derive(Error, Debug)]
#[error("Invalid RGB color string, expected RRGGBB hex")]
pub struct ParseRgbError;

impl FromStr for Rgb {
    type Err = ParseRgbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('#');
        if s.len() != 6 {
            return Err(ParseRgbError);
        }
        let parse = |range| u8::from_str_radix(&s[range], 16).map_err(|_| ParseRgbError);
        Ok(Self {
            r: parse(0..2)?,
            g: parse(2..4)?,
            b: parse(4..6)?,
        })
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// One LED on the device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Led {
    /// Owning profile, or `PROFILE_INVALID` for global LEDs.
    pub profile_id: u32,
    pub name: String,
    pub state: bool,
    /// Present iff the daemon reported a color for this LED.
    pub color: Option<Rgb>,
    pub can_change_color: bool,
}

impl Led {
    /// Decode from the (flags, name, state, color) record of a GETLEDS reply.
    pub fn from_record(profile_id: u32, flags: u32, name: String, state: u32, color: u32) -> Self {
        Self {
            profile_id,
            name,
            state: state != 0,
            color: (flags & LED_FLAG_HAVECOLOR != 0).then(|| Rgb::from_u32(color)),
            can_change_color: flags & LED_FLAG_CHANGECOLOR != 0,
        }
    }
}

/// A named resolution configuration selectable per profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DpiMapping {
    pub id: u32,
    /// Per-axis resolution; an axis is present iff its bitmask bit was set.
    pub res: [Option<u32>; NR_AXES],
    /// Profile applicability bitmask; 0 means "applies to all profiles".
    pub profile_mask: u64,
    pub mutable: bool,
}

/// A physical button on the device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Button {
    pub id: u32,
    pub name: String,
}

/// A logical function assignable to a button.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ButtonFunction {
    pub id: u32,
    pub name: String,
}

/// A scan resolution axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Axis {
    pub id: u32,
    pub name: String,
    pub flags: u32,
}

impl Axis {
    pub fn has_independent_dpi_mapping(&self) -> bool {
        self.flags & AXIS_FLAG_INDEPENDENT_DPIMAPPING != 0
    }
}

/// Device firmware version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FwVersion {
    pub major: u8,
    pub minor: u8,
}

impl FwVersion {
    pub fn from_u32(raw: u32) -> Self {
        Self {
            major: (raw >> 8) as u8,
            minor: raw as u8,
        }
    }
}

impl fmt::Display for FwVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.major, self.minor)
    }
}

/// Status code the daemon replies with to mutating commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    None,
    CommandSize,
    NoMemory,
    NoMouse,
    NoLed,
    Claim,
    Fail,
    Payload,
    NotSupported,
    Unknown(u32),
}

impl ErrorCode {
    pub fn from_u32(value: u32) -> Self {
        match value {
            ERR_NONE => Self::None,
            ERR_CMDSIZE => Self::CommandSize,
            ERR_NOMEM => Self::NoMemory,
            ERR_NOMOUSE => Self::NoMouse,
            ERR_NOLED => Self::NoLed,
            ERR_CLAIM => Self::Claim,
            ERR_FAIL => Self::Fail,
            ERR_PAYLOAD => Self::Payload,
            ERR_NOTSUPP => Self::NotSupported,
            other => Self::Unknown(other),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "Success"),
            Self::CommandSize => write!(f, "Invalid command size"),
            Self::NoMemory => write!(f, "Out of memory"),
            Self::NoMouse => write!(f, "Could not find mouse"),
            Self::NoLed => write!(f, "Could not find LED"),
            Self::Claim => write!(f, "Failed to claim device"),
            Self::Fail => write!(f, "Failure"),
            Self::Payload => write!(f, "Payload error"),
            Self::NotSupported => write!(f, "Operation not supported"),
            Self::Unknown(code) => write!(f, "Unknown error (code {code})"),
        }
    }
}
