//! Screen View Derivation
//!
//! What the presentation layer shows, as a pure function of session state.

use serde::{Serialize, Deserialize};

use crate::game::choice::Choice;
use crate::game::state::{RoundResult, SessionState};

/// Idle instruction.
pub const TEXT_CHOOSE: &str = "Choose your weapon...";

/// Instruction while the remote side has not answered.
pub const TEXT_WAITING: &str = "Waiting for opponent...";

/// Image shown next to the instruction text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageId {
    /// Neutral placeholder
    Unknown,
    /// Rock
    Rock,
    /// Paper
    Paper,
    /// Scissors
    Scissors,
}

impl From<Choice> for ImageId {
    fn from(choice: Choice) -> Self {
        match choice {
            Choice::Rock => ImageId::Rock,
            Choice::Paper => ImageId::Paper,
            Choice::Scissors => ImageId::Scissors,
            Choice::Waiting => ImageId::Unknown,
        }
    }
}

/// Everything the presentation collaborator needs for one frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenView {
    /// Instruction or announcement text.
    pub instruction_text: String,
    /// Image to display.
    pub image: ImageId,
    /// Whether the Rock/Paper/Scissors inputs accept presses.
    pub input_enabled: bool,
}

impl ScreenView {
    /// Idle: pick a weapon.
    pub fn idle() -> Self {
        Self {
            instruction_text: TEXT_CHOOSE.to_string(),
            image: ImageId::Unknown,
            input_enabled: true,
        }
    }

    /// Local choice locked in, remote pending.
    pub fn waiting(local: Choice) -> Self {
        Self {
            instruction_text: TEXT_WAITING.to_string(),
            image: local.into(),
            input_enabled: false,
        }
    }

    /// Reveal window after a resolution. Held static until it expires.
    pub fn reveal(result: &RoundResult) -> Self {
        Self {
            instruction_text: result.reveal_text(),
            image: result.local_choice.into(),
            input_enabled: false,
        }
    }

    /// View for a state with no reveal on screen.
    ///
    /// Waiting for the local player alone renders the same as idle.
    pub fn derive(state: &SessionState) -> Self {
        if state.local_pending() {
            Self::waiting(state.local_choice)
        } else {
            Self::idle()
        }
    }
}
