//! Protocol constants for the razerd socket interface.
//!
//! Command and reply identifiers form the binary contract between this
//! client and the razerd daemon; the numeric values must never change.

// ============================================================================
// Daemon Endpoints
// ============================================================================

/// Unprivileged razerd socket.
pub const SOCKET_PATH: &str = "/var/run/razerd/socket";

/// Privileged razerd socket (device-mutating and flashing operations).
pub const PRIVILEGED_SOCKET_PATH: &str = "/var/run/razerd/socket.privileged";

/// Socket interface revision this client speaks.
pub const INTERFACE_REVISION: u32 = 4;

// ============================================================================
// Size Constants
// ============================================================================

/// Every command frame is exactly this long.
pub const COMMAND_MAX_SIZE: usize = 512;
/// Command header is a single identifier byte.
pub const COMMAND_HDR_SIZE: usize = 1;
/// Chunk size for privileged bulk transfers.
pub const BULK_CHUNK_SIZE: usize = 128;
/// Device identity string field width.
pub const IDSTR_MAX_SIZE: usize = 128;
/// LED name field width.
pub const LEDNAME_MAX_SIZE: usize = 64;
/// Profile name length limit, in UTF-16 code units.
pub const PROFNAME_MAX_LEN: usize = 64;
/// Number of resolution axes in a DPI mapping.
pub const NR_AXES: usize = 3;

// ============================================================================
// Command Identifiers (Host -> Daemon)
// ============================================================================

/// Get the revision number of the socket interface.
pub const COMMAND_ID_GETREV: u8 = 0;
/// Rescan mice.
pub const COMMAND_ID_RESCANMICE: u8 = 1;
/// Get a list of detected mice.
pub const COMMAND_ID_GETMICE: u8 = 2;
/// Get the firmware revision of a mouse.
pub const COMMAND_ID_GETFWVER: u8 = 3;
/// Get a list of supported frequencies.
pub const COMMAND_ID_SUPPFREQS: u8 = 4;
/// Get a list of supported resolutions.
pub const COMMAND_ID_SUPPRESOL: u8 = 5;
/// Get a list of supported DPI mappings.
pub const COMMAND_ID_SUPPDPIMAPPINGS: u8 = 6;
/// Modify a DPI mapping.
pub const COMMAND_ID_CHANGEDPIMAPPING: u8 = 7;
/// Get the active DPI mapping for a profile.
pub const COMMAND_ID_GETDPIMAPPING: u8 = 8;
/// Set the active DPI mapping for a profile.
pub const COMMAND_ID_SETDPIMAPPING: u8 = 9;
/// Get a list of LEDs on the device.
pub const COMMAND_ID_GETLEDS: u8 = 10;
/// Set the state of a LED.
pub const COMMAND_ID_SETLED: u8 = 11;
/// Get the current frequency.
pub const COMMAND_ID_GETFREQ: u8 = 12;
/// Set the frequency.
pub const COMMAND_ID_SETFREQ: u8 = 13;
/// Get a list of supported profiles.
pub const COMMAND_ID_GETPROFILES: u8 = 14;
/// Get the active profile.
pub const COMMAND_ID_GETACTIVEPROF: u8 = 15;
/// Set the active profile.
pub const COMMAND_ID_SETACTIVEPROF: u8 = 16;
/// Get a list of physical buttons.
pub const COMMAND_ID_SUPPBUTTONS: u8 = 17;
/// Get a list of supported button functions.
pub const COMMAND_ID_SUPPBUTFUNCS: u8 = 18;
/// Get the current function of a button.
pub const COMMAND_ID_GETBUTFUNC: u8 = 19;
/// Set the current function of a button.
pub const COMMAND_ID_SETBUTFUNC: u8 = 20;
/// Get a list of supported axes.
pub const COMMAND_ID_SUPPAXES: u8 = 21;
/// Reconfigure all mice.
pub const COMMAND_ID_RECONFIGMICE: u8 = 22;
/// Get detailed information about a mouse.
pub const COMMAND_ID_GETMOUSEINFO: u8 = 23;
/// Get a profile name.
pub const COMMAND_ID_GETPROFNAME: u8 = 24;
/// Set a profile name.
pub const COMMAND_ID_SETPROFNAME: u8 = 25;

// Privileged commands. Only valid on the privileged socket.

/// Upload and flash a firmware image.
pub const COMMAND_PRIV_FLASHFW: u8 = 128;
/// Claim the device.
pub const COMMAND_PRIV_CLAIM: u8 = 129;
/// Release the device.
pub const COMMAND_PRIV_RELEASE: u8 = 130;

// ============================================================================
// Reply and Notification Identifiers (Daemon -> Host)
// ============================================================================

/// An unsigned 32bit integer.
pub const REPLY_ID_U32: u8 = 0;
/// A string.
pub const REPLY_ID_STR: u8 = 1;

/// First notification identifier. Notifications share the reply channel.
pub const NOTIFY_ID_FIRST: u8 = 128;
/// New mouse was connected.
pub const NOTIFY_ID_NEWMOUSE: u8 = 128;
/// A mouse was removed.
pub const NOTIFY_ID_DELMOUSE: u8 = 129;

// ============================================================================
// String Encodings
// ============================================================================

pub const STRING_ENC_ASCII: u8 = 0;
pub const STRING_ENC_UTF8: u8 = 1;
pub const STRING_ENC_UTF16BE: u8 = 2;

// ============================================================================
// Daemon Error Codes
// ============================================================================

pub const ERR_NONE: u32 = 0;
pub const ERR_CMDSIZE: u32 = 1;
pub const ERR_NOMEM: u32 = 2;
pub const ERR_NOMOUSE: u32 = 3;
pub const ERR_NOLED: u32 = 4;
pub const ERR_CLAIM: u32 = 5;
pub const ERR_FAIL: u32 = 6;
pub const ERR_PAYLOAD: u32 = 7;
pub const ERR_NOTSUPP: u32 = 8;

// ============================================================================
// Flags
// ============================================================================

/// The axis has an independently selectable DPI mapping.
pub const AXIS_FLAG_INDEPENDENT_DPIMAPPING: u32 = 1 << 0;

// Mouse info flags.
pub const MOUSEINFOFLG_RESULTOK: u32 = 1 << 0;
pub const MOUSEINFOFLG_GLOBAL_LEDS: u32 = 1 << 1;
pub const MOUSEINFOFLG_PROFILE_LEDS: u32 = 1 << 2;
pub const MOUSEINFOFLG_GLOBAL_FREQ: u32 = 1 << 3;
pub const MOUSEINFOFLG_PROFILE_FREQ: u32 = 1 << 4;
pub const MOUSEINFOFLG_PROFNAMEMUTABLE: u32 = 1 << 5;

// LED flags.
pub const LED_FLAG_HAVECOLOR: u32 = 1 << 0;
pub const LED_FLAG_CHANGECOLOR: u32 = 1 << 1;

/// Special profile ID addressing the global (profile-less) scope.
pub const PROFILE_INVALID: u32 = 0xFFFF_FFFF;
