//! Protocol Messages
//!
//! Wire format shared with the accessory: a flat dictionary of integer keys
//! to integer values. No nesting, no schema versioning.
//! The JSON form is what the engine writes to debug logs.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::game::choice::{Choice, Outcome};

/// Key carrying a [`Choice`] code (accessory -> phone).
pub const KEY_CHOICE: u32 = 0;

/// Key carrying an [`Outcome`] code (phone -> accessory).
pub const KEY_RESULT: u32 = 1;

/// Transaction identifier the transport assigns to each inbound message.
pub type TransactionId = u8;

// =============================================================================
// APP MESSAGE
// =============================================================================

/// Flat key -> integer mapping exchanged with the accessory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMessage {
    fields: BTreeMap<u32, i32>,
}

impl AppMessage {
    /// Empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Message with a single field.
    pub fn with(key: u32, value: i32) -> Self {
        let mut msg = Self::new();
        msg.insert(key, value);
        msg
    }

    /// A `CHOICE` message.
    pub fn choice(choice: Choice) -> Self {
        Self::with(KEY_CHOICE, choice.code())
    }

    /// A `RESULT` message.
    pub fn result(outcome: Outcome) -> Self {
        Self::with(KEY_RESULT, outcome.code())
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, key: u32, value: i32) {
        self.fields.insert(key, value);
    }

    /// Read a field.
    pub fn get(&self, key: u32) -> Option<i32> {
        self.fields.get(&key).copied()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the message has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Playable choice carried under `CHOICE`, if any.
    ///
    /// Missing key, `Waiting` and unknown codes all read as "no choice".
    pub fn read_choice(&self) -> Option<Choice> {
        self.get(KEY_CHOICE).and_then(Choice::playable_from_code)
    }

    /// Raw `RESULT` code, if present.
    pub fn read_result_code(&self) -> Option<i32> {
        self.get(KEY_RESULT)
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// =============================================================================
// TRANSPORT FRAMES
// =============================================================================

/// A message delivered by the transport, tagged for acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Id to echo back in the ack.
    pub transaction_id: TransactionId,
    /// Message payload.
    pub payload: AppMessage,
}

impl InboundMessage {
    /// Wrap a payload.
    pub fn new(transaction_id: TransactionId, payload: AppMessage) -> Self {
        Self { transaction_id, payload }
    }
}

/// Everything the engine hands to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
    /// Acknowledge an inbound message.
    Ack {
        /// Id of the message being acknowledged.
        transaction_id: TransactionId,
    },
    /// Data message for the accessory.
    Message(AppMessage),
}
