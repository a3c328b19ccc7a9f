//! High-level client for the razerd configuration daemon.
//!
//! A `RazerClient` owns one connection to the standard socket and, when
//! available, one to the privileged socket. Every operation is a
//! synchronous request/response pair: build a command frame, send it, then
//! block for the matching reply while buffering interleaved notifications.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::notify::{NotificationQueue, NotifyError};
use crate::protocol::codec::{CodecError, build_command, u32_to_be32};
use crate::protocol::constants::{
    BULK_CHUNK_SIZE, COMMAND_ID_CHANGEDPIMAPPING, COMMAND_ID_GETACTIVEPROF,
    COMMAND_ID_GETBUTFUNC, COMMAND_ID_GETDPIMAPPING, COMMAND_ID_GETFREQ, COMMAND_ID_GETFWVER,
    COMMAND_ID_GETLEDS, COMMAND_ID_GETMICE, COMMAND_ID_GETMOUSEINFO, COMMAND_ID_GETPROFILES,
    COMMAND_ID_GETPROFNAME, COMMAND_ID_GETREV, COMMAND_ID_RECONFIGMICE, COMMAND_ID_RESCANMICE,
    COMMAND_ID_SETACTIVEPROF, COMMAND_ID_SETBUTFUNC, COMMAND_ID_SETDPIMAPPING,
    COMMAND_ID_SETFREQ, COMMAND_ID_SETLED, COMMAND_ID_SETPROFNAME, COMMAND_ID_SUPPAXES,
    COMMAND_ID_SUPPBUTFUNCS, COMMAND_ID_SUPPBUTTONS, COMMAND_ID_SUPPDPIMAPPINGS,
    COMMAND_ID_SUPPFREQS, COMMAND_ID_SUPPRESOL, COMMAND_PRIV_CLAIM, COMMAND_PRIV_FLASHFW,
    COMMAND_PRIV_RELEASE, INTERFACE_REVISION, LEDNAME_MAX_SIZE, MOUSEINFOFLG_RESULTOK, NR_AXES,
    PRIVILEGED_SOCKET_PATH, PROFILE_INVALID, PROFNAME_MAX_LEN, SOCKET_PATH,
};
use crate::protocol::message::{Notification, ProtocolError};
use crate::transport::{Channel, TransportError, UnixChannel};
use crate::types::{Axis, Button, ButtonFunction, DpiMapping, ErrorCode, FwVersion, Led, Rgb};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to connect to razerd: {0}")]
    ConnectionFailed(TransportError),

    #[error("Incompatible interface revision: razerd={got}, client={expected}")]
    IncompatibleRevision { expected: u32, got: u32 },

    #[error("Privileged operation requires the privileged socket")]
    PrivilegeRequired,

    #[error("Bulk transfer rejected by razerd (status {code})")]
    BulkTransferFailed { code: u32 },

    #[error("LED name too long: {actual} bytes, maximum {max}")]
    LedNameTooLong { actual: usize, max: usize },

    #[error("No mouse info available for {idstr}")]
    MouseInfoFailed { idstr: String },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Path to the standard razerd socket.
    pub socket_path: String,
    /// Path to the privileged razerd socket.
    pub privileged_socket_path: String,
    /// Whether to buffer asynchronous notifications for polling.
    pub enable_notifications: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            socket_path: SOCKET_PATH.to_string(),
            privileged_socket_path: PRIVILEGED_SOCKET_PATH.to_string(),
            enable_notifications: false,
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Client for the razerd daemon.
pub struct RazerClient<C: Channel> {
    chan: C,
    /// Absent when the privileged socket could not be opened; privileged
    /// operations then fail before any I/O.
    priv_chan: Option<C>,
    queue: NotificationQueue,
}

impl RazerClient<UnixChannel> {
    /// Connect to razerd and perform the revision handshake.
    ///
    /// Failure to open the standard socket is fatal. An unavailable
    /// privileged socket merely downgrades the client capability.
    pub fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let chan =
            UnixChannel::connect(&config.socket_path).map_err(ClientError::ConnectionFailed)?;
        let priv_chan = match UnixChannel::connect(&config.privileged_socket_path) {
            Ok(chan) => Some(chan),
            Err(err) => {
                info!(error = %err, "Privileged socket unavailable, privileged operations disabled");
                None
            }
        };
        Self::from_channels(chan, priv_chan, config.enable_notifications)
    }
}

impl<C: Channel> RazerClient<C> {
    /// Build a client over already connected channels and handshake.
    pub fn from_channels(
        chan: C,
        priv_chan: Option<C>,
        enable_notifications: bool,
    ) -> Result<Self, ClientError> {
        let mut client = Self {
            chan,
            priv_chan,
            queue: NotificationQueue::new(enable_notifications),
        };
        client.handshake()?;
        Ok(client)
    }

    fn handshake(&mut self) -> Result<(), ClientError> {
        self.send_command(COMMAND_ID_GETREV, "", &[])?;
        let revision = self.recv_u32()?;
        if revision != INTERFACE_REVISION {
            return Err(ClientError::IncompatibleRevision {
                expected: INTERFACE_REVISION,
                got: revision,
            });
        }
        debug!(revision, "Handshake complete");
        Ok(())
    }

    /// Whether privileged operations are available on this client.
    pub fn has_privilege(&self) -> bool {
        self.priv_chan.is_some()
    }

    // ------------------------------------------------------------------
    // Request/reply plumbing
    // ------------------------------------------------------------------

    fn send_command(&mut self, id: u8, idstr: &str, payload: &[u8]) -> Result<(), ClientError> {
        let cmd = build_command(id, idstr, payload)?;
        self.chan.send(&cmd)?;
        Ok(())
    }

    fn send_privileged_command(
        &mut self,
        id: u8,
        idstr: &str,
        payload: &[u8],
    ) -> Result<(), ClientError> {
        let cmd = build_command(id, idstr, payload)?;
        let chan = self.priv_chan.as_mut().ok_or(ClientError::PrivilegeRequired)?;
        chan.send(&cmd)?;
        Ok(())
    }

    fn recv_u32(&mut self) -> Result<u32, ClientError> {
        Ok(self.queue.recv_u32(&mut self.chan)?)
    }

    fn recv_string(&mut self) -> Result<String, ClientError> {
        Ok(self.queue.recv_string(&mut self.chan)?)
    }

    fn recv_u32_privileged(&mut self) -> Result<u32, ClientError> {
        let chan = self.priv_chan.as_mut().ok_or(ClientError::PrivilegeRequired)?;
        Ok(self.queue.recv_u32(chan)?)
    }

    fn recv_status(&mut self) -> Result<ErrorCode, ClientError> {
        Ok(ErrorCode::from_u32(self.recv_u32()?))
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    /// Drain and return pending notifications, in arrival order.
    pub fn poll_notifications(&mut self) -> Result<Vec<Notification>, ClientError> {
        Ok(self.queue.poll(&mut self.chan)?)
    }

    // ------------------------------------------------------------------
    // Device discovery and info
    // ------------------------------------------------------------------

    /// Ask the daemon to rescan for mice.
    pub fn rescan_mice(&mut self) -> Result<(), ClientError> {
        self.send_command(COMMAND_ID_RESCANMICE, "", &[])
    }

    /// Ask the daemon to reconfigure all mice.
    pub fn reconfigure_mice(&mut self) -> Result<(), ClientError> {
        self.send_command(COMMAND_ID_RECONFIGMICE, "", &[])
    }

    /// List the identity strings of all detected mice.
    pub fn get_mice(&mut self) -> Result<Vec<String>, ClientError> {
        self.send_command(COMMAND_ID_GETMICE, "", &[])?;
        let count = self.recv_u32()?;
        let mut mice = Vec::with_capacity(count as usize);
        for _ in 0..count {
            mice.push(self.recv_string()?);
        }
        Ok(mice)
    }

    /// Get the capability flags of a mouse.
    pub fn get_mouse_info(&mut self, idstr: &str) -> Result<u32, ClientError> {
        self.send_command(COMMAND_ID_GETMOUSEINFO, idstr, &[])?;
        let flags = self.recv_u32()?;
        if flags & MOUSEINFOFLG_RESULTOK == 0 {
            return Err(ClientError::MouseInfoFailed {
                idstr: idstr.to_string(),
            });
        }
        Ok(flags)
    }

    /// Get the firmware version of a mouse.
    pub fn get_fw_version(&mut self, idstr: &str) -> Result<FwVersion, ClientError> {
        self.send_command(COMMAND_ID_GETFWVER, idstr, &[])?;
        Ok(FwVersion::from_u32(self.recv_u32()?))
    }

    // ------------------------------------------------------------------
    // Scan frequency
    // ------------------------------------------------------------------

    /// List the supported scan frequencies, in Hz.
    pub fn get_supported_freqs(&mut self, idstr: &str) -> Result<Vec<u32>, ClientError> {
        self.send_command(COMMAND_ID_SUPPFREQS, idstr, &[])?;
        self.recv_u32_list()
    }

    /// Get the currently selected scan frequency.
    pub fn get_freq(&mut self, idstr: &str, profile_id: u32) -> Result<u32, ClientError> {
        let payload = u32_to_be32(profile_id);
        self.send_command(COMMAND_ID_GETFREQ, idstr, &payload)?;
        self.recv_u32()
    }

    /// Set a new scan frequency, in Hz.
    pub fn set_freq(
        &mut self,
        idstr: &str,
        profile_id: u32,
        freq: u32,
    ) -> Result<ErrorCode, ClientError> {
        let payload = be32_payload(&[profile_id, freq]);
        self.send_command(COMMAND_ID_SETFREQ, idstr, &payload)?;
        self.recv_status()
    }

    // ------------------------------------------------------------------
    // Scan resolution and DPI mappings
    // ------------------------------------------------------------------

    /// List the supported scan resolutions.
    pub fn get_supported_resolutions(&mut self, idstr: &str) -> Result<Vec<u32>, ClientError> {
        self.send_command(COMMAND_ID_SUPPRESOL, idstr, &[])?;
        self.recv_u32_list()
    }

    /// List the supported DPI mappings.
    pub fn get_supported_dpi_mappings(
        &mut self,
        idstr: &str,
    ) -> Result<Vec<DpiMapping>, ClientError> {
        self.send_command(COMMAND_ID_SUPPDPIMAPPINGS, idstr, &[])?;
        let count = self.recv_u32()?;
        let mut mappings = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let id = self.recv_u32()?;
            let dim_mask = self.recv_u32()?;
            let mut res = [None; NR_AXES];
            for (axis, slot) in res.iter_mut().enumerate() {
                let value = self.recv_u32()?;
                if dim_mask & (1 << axis) != 0 {
                    *slot = Some(value);
                }
            }
            let mask_high = self.recv_u32()? as u64;
            let mask_low = self.recv_u32()? as u64;
            let mutable = self.recv_u32()?;
            mappings.push(DpiMapping {
                id,
                res,
                profile_mask: (mask_high << 32) | mask_low,
                mutable: mutable != 0,
            });
        }
        Ok(mappings)
    }

    /// Change one resolution value of a DPI mapping.
    pub fn change_dpi_mapping(
        &mut self,
        idstr: &str,
        mapping_id: u32,
        dimension_id: u32,
        resolution: u32,
    ) -> Result<ErrorCode, ClientError> {
        let payload = be32_payload(&[mapping_id, dimension_id, resolution]);
        self.send_command(COMMAND_ID_CHANGEDPIMAPPING, idstr, &payload)?;
        self.recv_status()
    }

    /// Get the DPI mapping of a profile, optionally for one axis.
    pub fn get_dpi_mapping(
        &mut self,
        idstr: &str,
        profile_id: u32,
        axis_id: Option<u32>,
    ) -> Result<u32, ClientError> {
        let payload = be32_payload(&[profile_id, axis_id.unwrap_or(PROFILE_INVALID)]);
        self.send_command(COMMAND_ID_GETDPIMAPPING, idstr, &payload)?;
        self.recv_u32()
    }

    /// Set the DPI mapping of a profile, optionally for one axis.
    pub fn set_dpi_mapping(
        &mut self,
        idstr: &str,
        profile_id: u32,
        mapping_id: u32,
        axis_id: Option<u32>,
    ) -> Result<ErrorCode, ClientError> {
        let payload = be32_payload(&[
            profile_id,
            axis_id.unwrap_or(PROFILE_INVALID),
            mapping_id,
        ]);
        self.send_command(COMMAND_ID_SETDPIMAPPING, idstr, &payload)?;
        self.recv_status()
    }

    // ------------------------------------------------------------------
    // LEDs
    // ------------------------------------------------------------------

    /// List the LEDs of a profile, or the global LEDs for `PROFILE_INVALID`.
    pub fn get_leds(&mut self, idstr: &str, profile_id: u32) -> Result<Vec<Led>, ClientError> {
        let payload = u32_to_be32(profile_id);
        self.send_command(COMMAND_ID_GETLEDS, idstr, &payload)?;
        let count = self.recv_u32()?;
        let mut leds = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let flags = self.recv_u32()?;
            let name = self.recv_string()?;
            let state = self.recv_u32()?;
            let color = self.recv_u32()?;
            leds.push(Led::from_record(profile_id, flags, name, state, color));
        }
        Ok(leds)
    }

    /// Apply a LED state.
    pub fn set_led(&mut self, idstr: &str, led: &Led) -> Result<ErrorCode, ClientError> {
        if led.name.len() > LEDNAME_MAX_SIZE {
            return Err(ClientError::LedNameTooLong {
                actual: led.name.len(),
                max: LEDNAME_MAX_SIZE,
            });
        }
        let mut payload = u32_to_be32(led.profile_id).to_vec();
        payload.extend_from_slice(led.name.as_bytes());
        payload.resize(4 + LEDNAME_MAX_SIZE, 0);
        payload.push(led.state as u8);
        payload.extend_from_slice(&u32_to_be32(led.color.map_or(0, Rgb::to_u32)));
        self.send_command(COMMAND_ID_SETLED, idstr, &payload)?;
        self.recv_status()
    }

    // ------------------------------------------------------------------
    // Profiles
    // ------------------------------------------------------------------

    /// List the profile ids of a mouse.
    pub fn get_profiles(&mut self, idstr: &str) -> Result<Vec<u32>, ClientError> {
        self.send_command(COMMAND_ID_GETPROFILES, idstr, &[])?;
        self.recv_u32_list()
    }

    /// Get the id of the active profile.
    pub fn get_active_profile(&mut self, idstr: &str) -> Result<u32, ClientError> {
        self.send_command(COMMAND_ID_GETACTIVEPROF, idstr, &[])?;
        self.recv_u32()
    }

    /// Select the active profile.
    pub fn set_active_profile(
        &mut self,
        idstr: &str,
        profile_id: u32,
    ) -> Result<ErrorCode, ClientError> {
        let payload = u32_to_be32(profile_id);
        self.send_command(COMMAND_ID_SETACTIVEPROF, idstr, &payload)?;
        self.recv_status()
    }

    /// Get a profile name.
    pub fn get_profile_name(
        &mut self,
        idstr: &str,
        profile_id: u32,
    ) -> Result<String, ClientError> {
        let payload = u32_to_be32(profile_id);
        self.send_command(COMMAND_ID_GETPROFNAME, idstr, &payload)?;
        self.recv_string()
    }

    /// Set a profile name. Encoded UTF-16BE, truncated to 64 code units.
    pub fn set_profile_name(
        &mut self,
        idstr: &str,
        profile_id: u32,
        name: &str,
    ) -> Result<ErrorCode, ClientError> {
        let mut raw: Vec<u8> = name
            .encode_utf16()
            .flat_map(|unit| unit.to_be_bytes())
            .collect();
        raw.truncate(PROFNAME_MAX_LEN * 2);
        raw.resize(PROFNAME_MAX_LEN * 2, 0);

        let mut payload = u32_to_be32(profile_id).to_vec();
        payload.extend_from_slice(&raw);
        self.send_command(COMMAND_ID_SETPROFNAME, idstr, &payload)?;
        self.recv_status()
    }

    // ------------------------------------------------------------------
    // Buttons and axes
    // ------------------------------------------------------------------

    /// List the physical buttons of a mouse.
    pub fn get_supported_buttons(&mut self, idstr: &str) -> Result<Vec<Button>, ClientError> {
        self.send_command(COMMAND_ID_SUPPBUTTONS, idstr, &[])?;
        let count = self.recv_u32()?;
        let mut buttons = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let id = self.recv_u32()?;
            let name = self.recv_string()?;
            buttons.push(Button { id, name });
        }
        Ok(buttons)
    }

    /// List the assignable button functions.
    pub fn get_supported_button_functions(
        &mut self,
        idstr: &str,
    ) -> Result<Vec<ButtonFunction>, ClientError> {
        self.send_command(COMMAND_ID_SUPPBUTFUNCS, idstr, &[])?;
        let count = self.recv_u32()?;
        let mut funcs = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let id = self.recv_u32()?;
            let name = self.recv_string()?;
            funcs.push(ButtonFunction { id, name });
        }
        Ok(funcs)
    }

    /// Get the function currently assigned to a button.
    pub fn get_button_function(
        &mut self,
        idstr: &str,
        profile_id: u32,
        button_id: u32,
    ) -> Result<ButtonFunction, ClientError> {
        let payload = be32_payload(&[profile_id, button_id]);
        self.send_command(COMMAND_ID_GETBUTFUNC, idstr, &payload)?;
        let id = self.recv_u32()?;
        let name = self.recv_string()?;
        Ok(ButtonFunction { id, name })
    }

    /// Assign a function to a button.
    pub fn set_button_function(
        &mut self,
        idstr: &str,
        profile_id: u32,
        button_id: u32,
        function_id: u32,
    ) -> Result<ErrorCode, ClientError> {
        let payload = be32_payload(&[profile_id, button_id, function_id]);
        self.send_command(COMMAND_ID_SETBUTFUNC, idstr, &payload)?;
        self.recv_status()
    }

    /// List the resolution axes of a mouse.
    pub fn get_supported_axes(&mut self, idstr: &str) -> Result<Vec<Axis>, ClientError> {
        self.send_command(COMMAND_ID_SUPPAXES, idstr, &[])?;
        let count = self.recv_u32()?;
        let mut axes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let id = self.recv_u32()?;
            let name = self.recv_string()?;
            let flags = self.recv_u32()?;
            axes.push(Axis { id, name, flags });
        }
        Ok(axes)
    }

    // ------------------------------------------------------------------
    // Privileged operations
    // ------------------------------------------------------------------

    /// Claim exclusive access to a device.
    pub fn claim(&mut self, idstr: &str) -> Result<ErrorCode, ClientError> {
        self.send_privileged_command(COMMAND_PRIV_CLAIM, idstr, &[])?;
        Ok(ErrorCode::from_u32(self.recv_u32_privileged()?))
    }

    /// Release a previously claimed device.
    pub fn release(&mut self, idstr: &str) -> Result<ErrorCode, ClientError> {
        self.send_privileged_command(COMMAND_PRIV_RELEASE, idstr, &[])?;
        Ok(ErrorCode::from_u32(self.recv_u32_privileged()?))
    }

    /// Upload and flash a firmware image.
    ///
    /// The image is announced with its length, then streamed in
    /// acknowledgment-gated chunks. A non-zero acknowledgment aborts the
    /// whole transfer; flashing is not resumable.
    pub fn flash_firmware(&mut self, idstr: &str, image: &[u8]) -> Result<ErrorCode, ClientError> {
        if self.priv_chan.is_none() {
            return Err(ClientError::PrivilegeRequired);
        }
        info!(len = image.len(), "Flashing firmware image");

        let payload = u32_to_be32(image.len() as u32);
        self.send_privileged_command(COMMAND_PRIV_FLASHFW, idstr, &payload)?;
        self.send_bulk_privileged(image)?;

        let status = ErrorCode::from_u32(self.recv_u32_privileged()?);
        info!(%status, "Firmware flash finished");
        Ok(status)
    }

    fn send_bulk_privileged(&mut self, data: &[u8]) -> Result<(), ClientError> {
        let total = data.len().div_ceil(BULK_CHUNK_SIZE);
        for (index, chunk) in data.chunks(BULK_CHUNK_SIZE).enumerate() {
            {
                let chan = self.priv_chan.as_mut().ok_or(ClientError::PrivilegeRequired)?;
                chan.send(chunk)?;
            }
            let code = self.recv_u32_privileged()?;
            if code != 0 {
                warn!(chunk = index + 1, total, code, "Bulk chunk rejected");
                return Err(ClientError::BulkTransferFailed { code });
            }
            debug!(chunk = index + 1, total, "Bulk chunk acknowledged");
        }
        Ok(())
    }

    fn recv_u32_list(&mut self) -> Result<Vec<u32>, ClientError> {
        let count = self.recv_u32()?;
        let mut values = Vec::with_capacity(count as usize);
        for _ in 0..count {
            values.push(self.recv_u32()?);
        }
        Ok(values)
    }
}

fn be32_payload(values: &[u32]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(values.len() * 4);
    for &value in values {
        payload.extend_from_slice(&u32_to_be32(value));
    }
    payload
}
