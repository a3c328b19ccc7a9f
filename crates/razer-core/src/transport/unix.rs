//! Unix domain socket channel implementation.

use std::io::{ErrorKind, Read, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;

use tracing::debug;

use super::traits::{Channel, TransportError};

/// Blocking channel over a connected Unix domain stream socket.
pub struct UnixChannel {
    stream: UnixStream,
}

impl UnixChannel {
    /// Connect to a razerd socket path.
    pub fn connect<P: AsRef<Path>>(path: P) -> Result<Self, TransportError> {
        let path = path.as_ref();
        let stream = UnixStream::connect(path).map_err(|e| TransportError::ConnectFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), "Connected");
        Ok(Self { stream })
    }
}

impl From<UnixStream> for UnixChannel {
    fn from(stream: UnixStream) -> Self {
        Self { stream }
    }
}

impl Channel for UnixChannel {
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.stream.write_all(data).map_err(|e| match e.kind() {
            ErrorKind::BrokenPipe | ErrorKind::ConnectionReset => TransportError::Closed,
            _ => TransportError::Io(e),
        })
    }

    fn recv_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        self.stream.read_exact(buf).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof | ErrorKind::ConnectionReset => TransportError::Closed,
            _ => TransportError::Io(e),
        })
    }

    fn data_available(&mut self) -> Result<bool, TransportError> {
        // Nonblocking one-byte peek; the byte stays in the kernel buffer.
        self.stream.set_nonblocking(true)?;
        let mut probe = [0u8; 1];
        let result = self.stream.peek(&mut probe);
        self.stream.set_nonblocking(false)?;

        match result {
            Ok(0) => Err(TransportError::Closed),
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(false),
            Err(e) => Err(TransportError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_recv_pair() {
        let (a, b) = UnixStream::pair().unwrap();
        let mut tx = UnixChannel::from(a);
        let mut rx = UnixChannel::from(b);

        assert!(!rx.data_available().unwrap());

        tx.send(&[1, 2, 3, 4]).unwrap();
        assert!(rx.data_available().unwrap());

        let mut buf = [0u8; 4];
        rx.recv_exact(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);
        assert!(!rx.data_available().unwrap());
    }

    #[test]
    fn test_closed_peer() {
        let (a, b) = UnixStream::pair().unwrap();
        let mut rx = UnixChannel::from(b);
        drop(a);

        let mut buf = [0u8; 1];
        assert!(matches!(
            rx.recv_exact(&mut buf),
            Err(TransportError::Closed)
        ));
    }

    #[test]
    fn test_connect_missing_path() {
        assert!(matches!(
            UnixChannel::connect("/nonexistent/razerd/socket"),
            Err(TransportError::ConnectFailed { .. })
        ));
    }
}
