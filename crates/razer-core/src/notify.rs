//! Notification buffering and reply expectation filtering.
//!
//! While a request waits for its reply, razerd may interleave asynchronous
//! notifications on the same channel. The queue preserves them in arrival
//! order for a later poll instead of discarding them.

use thiserror::Error;
use tracing::debug;

use crate::protocol::message::{Message, Notification, ProtocolError, read_message};
use crate::transport::Channel;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notifications polled while disabled for this client")]
    NotificationsDisabled,

    /// A reply message arrived that nobody was waiting for. The stream
    /// framing is now suspect relative to caller expectations.
    #[error("Received unexpected message (id={0})")]
    UnexpectedMessage(u8),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Ordered buffer of notifications observed between polls.
pub struct NotificationQueue {
    enabled: bool,
    pending: Vec<Notification>,
}

impl NotificationQueue {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            pending: Vec::new(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Receive messages until a U32 reply appears, buffering notifications.
    pub fn recv_u32<C: Channel>(&mut self, chan: &mut C) -> Result<u32, NotifyError> {
        loop {
            match read_message(chan)? {
                Message::U32(value) => return Ok(value),
                other => self.handle_unsolicited(other)?,
            }
        }
    }

    /// Receive messages until a string reply appears, buffering notifications.
    pub fn recv_string<C: Channel>(&mut self, chan: &mut C) -> Result<String, NotifyError> {
        loop {
            match read_message(chan)? {
                Message::Str(s) => return Ok(s),
                other => self.handle_unsolicited(other)?,
            }
        }
    }

    /// Drain immediately available messages, then return and reset the
    /// buffered notifications, in arrival order.
    pub fn poll<C: Channel>(&mut self, chan: &mut C) -> Result<Vec<Notification>, NotifyError> {
        if !self.enabled {
            return Err(NotifyError::NotificationsDisabled);
        }
        while chan.data_available().map_err(ProtocolError::Transport)? {
            let msg = read_message(chan)?;
            self.handle_unsolicited(msg)?;
        }
        Ok(std::mem::take(&mut self.pending))
    }

    fn handle_unsolicited(&mut self, msg: Message) -> Result<(), NotifyError> {
        match msg {
            Message::Notification(notification) => {
                if self.enabled {
                    debug!(?notification, "Buffering notification");
                    self.pending.push(notification);
                } else {
                    debug!(?notification, "Dropping notification, queue disabled");
                }
                Ok(())
            }
            other => Err(NotifyError::UnexpectedMessage(other.id())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::constants::{NOTIFY_ID_DELMOUSE, NOTIFY_ID_NEWMOUSE};
    use crate::transport::MockChannel;

    #[test]
    fn test_recv_u32_buffers_notifications_in_order() {
        let mut chan = MockChannel::new();
        let mut queue = NotificationQueue::new(true);

        chan.queue_notification(NOTIFY_ID_NEWMOUSE);
        chan.queue_notification(NOTIFY_ID_DELMOUSE);
        chan.queue_u32(7);

        assert_eq!(queue.recv_u32(&mut chan).unwrap(), 7);
        let pending = queue.poll(&mut chan).unwrap();
        assert_eq!(
            pending,
            vec![Notification::NewMouse, Notification::DelMouse]
        );

        // Buffer is empty right after a poll.
        assert!(queue.poll(&mut chan).unwrap().is_empty());
    }

    #[test]
    fn test_disabled_queue_drops_notifications() {
        let mut chan = MockChannel::new();
        let mut queue = NotificationQueue::new(false);

        chan.queue_notification(NOTIFY_ID_NEWMOUSE);
        chan.queue_u32(1);
        assert_eq!(queue.recv_u32(&mut chan).unwrap(), 1);
    }

    #[test]
    fn test_poll_disabled_fails() {
        let mut chan = MockChannel::new();
        let mut queue = NotificationQueue::new(false);
        assert!(matches!(
            queue.poll(&mut chan),
            Err(NotifyError::NotificationsDisabled)
        ));
    }

    #[test]
    fn test_unexpected_reply_is_fatal() {
        let mut chan = MockChannel::new();
        let mut queue = NotificationQueue::new(true);

        chan.queue_string("spurious");
        assert!(matches!(
            queue.recv_u32(&mut chan),
            Err(NotifyError::UnexpectedMessage(1))
        ));
    }

    #[test]
    fn test_poll_drains_pending_channel_data() {
        let mut chan = MockChannel::new();
        let mut queue = NotificationQueue::new(true);

        chan.queue_notification(NOTIFY_ID_DELMOUSE);
        chan.queue_notification(NOTIFY_ID_NEWMOUSE);

        let pending = queue.poll(&mut chan).unwrap();
        assert_eq!(
            pending,
            vec![Notification::DelMouse, Notification::NewMouse]
        );
    }
}
