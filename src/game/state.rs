//! Session State
//!
//! The two pending choices and the running tallies for one session.
//! Every mutation that can complete a round goes through [`SessionState::resolve`],
//! which updates counters and clears both choices in one step.

use serde::{Serialize, Deserialize};

use crate::game::choice::{rules, Choice, Outcome};

// =============================================================================
// ROUND RESULT
// =============================================================================

/// Record of a single resolved round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    /// What the local player threw.
    pub local_choice: Choice,
    /// What the remote player threw.
    pub remote_choice: Choice,
    /// Outcome for the local player.
    pub outcome: Outcome,
    /// Rounds won after this round.
    pub rounds_won: u32,
    /// Rounds played after this round.
    pub rounds_played: u32,
}

impl RoundResult {
    /// Outcome the remote player should display.
    pub fn remote_outcome(&self) -> Outcome {
        self.outcome.inverse()
    }

    /// Text shown during the reveal window.
    pub fn reveal_text(&self) -> String {
        outcome_text(self.outcome, self.rounds_won, self.rounds_played)
    }
}

/// Announcement for an outcome, with the session tally on a win.
pub fn outcome_text(outcome: Outcome, won: u32, played: u32) -> String {
    match outcome {
        Outcome::Win => format!("You win! ({} of {})", won, played),
        Outcome::Lose => "You lose!".to_string(),
        Outcome::Tie => "It's a tie!".to_string(),
    }
}

// =============================================================================
// SESSION STATE
// =============================================================================

/// Choices and tallies for the current session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Local player's pending choice.
    pub local_choice: Choice,
    /// Remote player's pending choice.
    pub remote_choice: Choice,
    /// Rounds resolved this session.
    pub rounds_played: u32,
    /// Rounds the local player won this session.
    pub rounds_won: u32,
}

impl SessionState {
    /// Fresh session: both sides waiting, zero tallies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset everything for a new session.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Both sides have submitted this round.
    #[inline]
    pub fn both_ready(&self) -> bool {
        self.local_choice.is_playable() && self.remote_choice.is_playable()
    }

    /// Whether the local player has a choice pending.
    #[inline]
    pub fn local_pending(&self) -> bool {
        self.local_choice.is_playable()
    }

    /// Record the local choice and resolve if the remote side is in.
    pub fn set_local(&mut self, choice: Choice) -> Option<RoundResult> {
        self.local_choice = choice;
        self.resolve()
    }

    /// Record the remote choice and resolve if the local side is in.
    pub fn set_remote(&mut self, choice: Choice) -> Option<RoundResult> {
        self.remote_choice = choice;
        self.resolve()
    }

    /// Resolve the round if both choices are present.
    ///
    /// Counters are updated and both choices cleared before returning, so
    /// no caller ever sees one side reset without the other.
    pub fn resolve(&mut self) -> Option<RoundResult> {
        let outcome = rules(self.local_choice, self.remote_choice)?;

        self.rounds_played += 1;
        if outcome == Outcome::Win {
            self.rounds_won += 1;
        }

        let result = RoundResult {
            local_choice: self.local_choice,
            remote_choice: self.remote_choice,
            outcome,
            rounds_won: self.rounds_won,
            rounds_played: self.rounds_played,
        };

        self.local_choice = Choice::Waiting;
        self.remote_choice = Choice::Waiting;

        debug_assert!(self.rounds_won <= self.rounds_played);
        Some(result)
    }
}
