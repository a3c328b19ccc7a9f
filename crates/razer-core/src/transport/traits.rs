//! Channel abstraction over the razerd stream sockets.
//!
//! Defines the `Channel` trait for blocking message transport, allowing
//! different implementations (Unix socket, mock, etc.).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to connect to {path}: {message}")]
    ConnectFailed { path: String, message: String },

    #[error("Channel closed by peer")]
    Closed,

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Abstract stream channel to the daemon.
///
/// This trait enables:
/// - Production implementation over Unix domain sockets
/// - Mock implementation for unit testing
pub trait Channel: Send {
    /// Write all bytes to the channel.
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Read exactly `buf.len()` bytes, blocking until they arrived.
    fn recv_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError>;

    /// Zero-timeout readiness check: whether at least one byte can be
    /// read without blocking.
    fn data_available(&mut self) -> Result<bool, TransportError>;
}
