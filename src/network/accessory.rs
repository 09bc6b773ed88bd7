//! Accessory Peer
//!
//! The wrist side of the protocol. It locks in one choice per round, sends it
//! as `CHOICE`, and displays the `RESULT` it receives (already expressed from
//! its own perspective) with its own tally.

use serde::{Serialize, Deserialize};

use crate::game::choice::{Choice, Outcome};
use crate::game::state::outcome_text;
use crate::network::protocol::AppMessage;

/// State of the accessory app.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryState {
    /// Locked-in choice, `Waiting` while the menu is open.
    pub choice: Choice,
    /// Results received this run.
    pub games: u32,
    /// Wins received this run.
    pub wins: u32,
    /// Result text on screen, if any.
    pub result_text: Option<String>,
}

impl AccessoryState {
    /// Fresh accessory: menu open, zero tallies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the choice menu accepts a selection.
    pub fn menu_open(&self) -> bool {
        self.choice == Choice::Waiting && self.result_text.is_none()
    }

    /// Select a weapon from the menu.
    ///
    /// Returns the message to send, or `None` if a choice is already locked
    /// in or `choice` is not playable.
    pub fn select(&mut self, choice: Choice) -> Option<AppMessage> {
        if self.choice != Choice::Waiting || !choice.is_playable() {
            return None;
        }
        self.choice = choice;
        Some(AppMessage::choice(choice))
    }

    /// Handle a message from the phone.
    ///
    /// Returns the outcome if the message carried a known `RESULT`.
    pub fn on_message(&mut self, message: &AppMessage) -> Option<Outcome> {
        let code = message.read_result_code()?;

        self.games += 1;
        let outcome = Outcome::from_code(code);
        if outcome == Some(Outcome::Win) {
            self.wins += 1;
        }

        // Unknown codes count as a game but leave the screen blank.
        self.result_text = Some(
            outcome
                .map(|o| outcome_text(o, self.wins, self.games))
                .unwrap_or_default(),
        );
        outcome
    }

    /// The result display timed out: reopen the menu.
    pub fn reveal_elapsed(&mut self) {
        self.result_text = None;
        self.choice = Choice::Waiting;
    }
}
