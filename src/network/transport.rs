//! Accessory Transport
//!
//! The engine's view of the accessory SDK: send a data message, acknowledge
//! an inbound one. Connection, pairing and retries live behind this trait.

use tokio::sync::mpsc;
#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::network::protocol::{AppMessage, OutboundFrame, TransactionId};

/// Transport errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The accessory link is gone.
    #[error("Transport closed")]
    Closed,
}

/// Outbound half of the accessory link.
///
/// Calls never block; delivery is fire-and-forget.
pub trait Transport: Send {
    /// Send a data message to the accessory.
    fn send(&mut self, message: AppMessage) -> Result<(), TransportError>;

    /// Acknowledge an inbound message.
    fn ack(&mut self, transaction_id: TransactionId) -> Result<(), TransportError>;
}

/// Transport that forwards frames over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<OutboundFrame>,
}

impl ChannelTransport {
    /// Create the transport and the receiver the link driver drains.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OutboundFrame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn push(&self, frame: OutboundFrame) -> Result<(), TransportError> {
        #[cfg(feature = "debug-tracing")]
        trace!(?frame, "outbound frame");

        self.tx.send(frame).map_err(|_| TransportError::Closed)
    }
}

impl Transport for ChannelTransport {
    fn send(&mut self, message: AppMessage) -> Result<(), TransportError> {
        self.push(OutboundFrame::Message(message))
    }

    fn ack(&mut self, transaction_id: TransactionId) -> Result<(), TransportError> {
        self.push(OutboundFrame::Ack { transaction_id })
    }
}
