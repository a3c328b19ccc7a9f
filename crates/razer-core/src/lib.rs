#![feature(unix_socket_peek)]
//! Client-side engine for the razerd device configuration daemon.
//!
//! razerd runs as a privileged background service and owns the USB devices;
//! this crate speaks its Unix socket protocol so tools can enumerate mice,
//! tune profiles, LEDs, frequencies and DPI mappings, and flash firmware
//! without touching USB themselves.
//!
//! The crate is layered:
//!
//! - [`protocol`]: wire constants, command framing, and reply decoding
//! - [`transport`]: the [`Channel`] abstraction over Unix sockets plus a
//!   mock implementation for tests
//! - [`notify`]: buffering of asynchronous notifications interleaved with
//!   replies
//! - [`client`]: the request/response operation catalog
//! - [`firmware`]: firmware update file identification and IHEX decoding
//! - [`devid`] and [`types`]: device identity parsing and value objects
//!
//! ```no_run
//! use razer_core::{ClientConfig, RazerClient};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = ClientConfig::default();
//! let mut client = RazerClient::connect(&config)?;
//! for idstr in client.get_mice()? {
//!     let version = client.get_fw_version(&idstr)?;
//!     println!("{idstr}: firmware {version}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod devid;
pub mod firmware;
pub mod notify;
pub mod protocol;
pub mod transport;
pub mod types;

pub use client::{ClientConfig, ClientError, RazerClient};
pub use devid::DevId;
pub use notify::{NotificationQueue, NotifyError};
pub use protocol::constants::PROFILE_INVALID;
pub use protocol::message::{Message, Notification, ProtocolError};
pub use transport::{Channel, MockChannel, TransportError, UnixChannel};
pub use types::{
    Axis, Button, ButtonFunction, DpiMapping, ErrorCode, FwVersion, Led, Rgb,
};
