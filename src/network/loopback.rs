//! Loopback Accessory Link
//!
//! Connects an in-process [`AccessoryState`] to a running host: accessory
//! selections become inbound messages with fresh transaction ids, and the
//! host's outbound frames are fed back into the accessory.

use std::collections::BTreeSet;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::game::choice::{Choice, Outcome};
use crate::network::accessory::AccessoryState;
use crate::network::host::{HostError, HostHandle};
use crate::network::protocol::{InboundMessage, OutboundFrame, TransactionId};

/// Simulated accessory on the far end of a [`ChannelTransport`](crate::network::transport::ChannelTransport).
pub struct LoopbackAccessory {
    state: AccessoryState,
    host: HostHandle,
    frames: mpsc::UnboundedReceiver<OutboundFrame>,
    next_transaction: TransactionId,
    unacked: BTreeSet<TransactionId>,
}

impl LoopbackAccessory {
    /// Attach to a host and the receiving end of its transport.
    pub fn new(host: HostHandle, frames: mpsc::UnboundedReceiver<OutboundFrame>) -> Self {
        Self {
            state: AccessoryState::new(),
            host,
            frames,
            next_transaction: 0,
            unacked: BTreeSet::new(),
        }
    }

    /// Accessory state.
    pub fn state(&self) -> &AccessoryState {
        &self.state
    }

    /// Transactions sent but not yet acknowledged.
    pub fn unacked(&self) -> usize {
        self.unacked.len()
    }

    /// Select a weapon on the accessory and send it to the host.
    ///
    /// Returns `Ok(false)` if the accessory menu did not accept the choice.
    pub async fn select(&mut self, choice: Choice) -> Result<bool, HostError> {
        let Some(payload) = self.state.select(choice) else {
            return Ok(false);
        };

        let transaction_id = self.next_transaction;
        self.next_transaction = self.next_transaction.wrapping_add(1);
        self.unacked.insert(transaction_id);

        self.host.inbound(InboundMessage::new(transaction_id, payload)).await?;
        Ok(true)
    }

    /// Wait for the next result, processing acks on the way.
    ///
    /// Returns `None` once the host side of the link has closed.
    pub async fn next_result(&mut self) -> Option<Outcome> {
        while let Some(frame) = self.frames.recv().await {
            if let Some(outcome) = self.apply(frame) {
                return Some(outcome);
            }
        }
        None
    }

    /// Process whatever frames are already queued.
    pub fn pump(&mut self) {
        while let Ok(frame) = self.frames.try_recv() {
            self.apply(frame);
        }
    }

    /// The accessory's result display timed out.
    pub fn reveal_elapsed(&mut self) {
        self.state.reveal_elapsed();
    }

    fn apply(&mut self, frame: OutboundFrame) -> Option<Outcome> {
        match frame {
            OutboundFrame::Ack { transaction_id } => {
                if !self.unacked.remove(&transaction_id) {
                    warn!("Unexpected ack for transaction {}", transaction_id);
                }
                None
            }
            OutboundFrame::Message(message) => {
                let outcome = self.state.on_message(&message);
                debug!(
                    "Accessory received {:?} ({} of {})",
                    outcome, self.state.wins, self.state.games
                );
                outcome
            }
        }
    }
}
