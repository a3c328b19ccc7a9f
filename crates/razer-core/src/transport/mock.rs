//! Mock channel for testing.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::traits::{Channel, TransportError};
use crate::protocol::constants::{REPLY_ID_STR, REPLY_ID_U32, STRING_ENC_ASCII};
use crate::protocol::codec::{u16_to_be16, u32_to_be32};

/// Mock channel for unit testing client logic.
///
/// Clones share the same internal state, so a test can keep a handle for
/// queueing replies and inspecting writes while the client owns its clone.
#[derive(Clone)]
pub struct MockChannel {
    /// Queued reply bytes returned on reads.
    rx_queue: Arc<Mutex<VecDeque<u8>>>,
    /// Captured writes, one entry per send call.
    write_log: Arc<Mutex<Vec<Vec<u8>>>>,
    /// Whether the peer is still "connected".
    connected: Arc<Mutex<bool>>,
}

impl MockChannel {
    pub fn new() -> Self {
        Self {
            rx_queue: Arc::new(Mutex::new(VecDeque::new())),
            write_log: Arc::new(Mutex::new(Vec::new())),
            connected: Arc::new(Mutex::new(true)),
        }
    }

    /// Queue raw bytes to be returned on subsequent reads.
    pub fn queue_bytes(&self, bytes: &[u8]) {
        self.rx_queue.lock().unwrap().extend(bytes.iter().copied());
    }

    /// Queue a framed U32 reply.
    pub fn queue_u32(&self, value: u32) {
        self.queue_bytes(&[REPLY_ID_U32]);
        self.queue_bytes(&u32_to_be32(value));
    }

    /// Queue a framed ASCII string reply.
    pub fn queue_string(&self, s: &str) {
        self.queue_bytes(&[REPLY_ID_STR, STRING_ENC_ASCII]);
        self.queue_bytes(&u16_to_be16(s.len() as u16));
        self.queue_bytes(s.as_bytes());
    }

    /// Queue a notification message.
    pub fn queue_notification(&self, id: u8) {
        self.queue_bytes(&[id]);
    }

    /// Get all captured writes.
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.write_log.lock().unwrap().clone()
    }

    /// Clear captured writes.
    pub fn clear_writes(&self) {
        self.write_log.lock().unwrap().clear();
    }

    /// Simulate peer disconnect.
    pub fn disconnect(&self) {
        *self.connected.lock().unwrap() = false;
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl Channel for MockChannel {
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if !*self.connected.lock().unwrap() {
            return Err(TransportError::Closed);
        }
        self.write_log.lock().unwrap().push(data.to_vec());
        Ok(())
    }

    fn recv_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        if !*self.connected.lock().unwrap() {
            return Err(TransportError::Closed);
        }
        let mut queue = self.rx_queue.lock().unwrap();
        if queue.len() < buf.len() {
            return Err(TransportError::ReadFailed(format!(
                "mock reply queue exhausted: need {}, have {}",
                buf.len(),
                queue.len()
            )));
        }
        for slot in buf.iter_mut() {
            *slot = queue.pop_front().unwrap();
        }
        Ok(())
    }

    fn data_available(&mut self) -> Result<bool, TransportError> {
        if !*self.connected.lock().unwrap() {
            return Err(TransportError::Closed);
        }
        Ok(!self.rx_queue.lock().unwrap().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_and_read() {
        let mut chan = MockChannel::new();
        chan.queue_bytes(&[1, 2, 3]);
        assert!(chan.data_available().unwrap());

        let mut buf = [0u8; 3];
        chan.recv_exact(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3]);
        assert!(!chan.data_available().unwrap());

        // Queue is empty now.
        assert!(chan.recv_exact(&mut buf).is_err());
    }

    #[test]
    fn test_write_capture_shared_between_clones() {
        let mut chan = MockChannel::new();
        let handle = chan.clone();
        chan.send(b"hello").unwrap();
        chan.send(b"world").unwrap();

        let writes = handle.writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0], b"hello");
        assert_eq!(writes[1], b"world");
    }

    #[test]
    fn test_disconnect() {
        let mut chan = MockChannel::new();
        chan.disconnect();
        assert!(matches!(chan.send(b"x"), Err(TransportError::Closed)));
        assert!(matches!(chan.data_available(), Err(TransportError::Closed)));
    }
}
