//! Choices, Outcomes and the Rule Table
//!
//! Integer codes match the accessory firmware bit-for-bit.

use serde::{Serialize, Deserialize};

// =============================================================================
// CHOICE
// =============================================================================

/// A player's weapon for the current round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Choice {
    /// Rock (wire code 0)
    Rock = 0,
    /// Paper (wire code 1)
    Paper = 1,
    /// Scissors (wire code 2)
    Scissors = 2,
    /// Not yet submitted this round (wire code 3)
    #[default]
    Waiting = 3,
}

impl Choice {
    /// The three playable choices, in wire-code order.
    pub const PLAYABLE: [Choice; 3] = [Choice::Rock, Choice::Paper, Choice::Scissors];

    /// Wire code for this choice.
    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Decode any wire code, including `Waiting`.
    pub fn from_code(code: i32) -> Option<Choice> {
        match code {
            0 => Some(Choice::Rock),
            1 => Some(Choice::Paper),
            2 => Some(Choice::Scissors),
            3 => Some(Choice::Waiting),
            _ => None,
        }
    }

    /// Decode a wire code that must name a playable choice.
    ///
    /// `Waiting` and unknown codes both mean "no choice received".
    pub fn playable_from_code(code: i32) -> Option<Choice> {
        Self::from_code(code).filter(|c| c.is_playable())
    }

    /// Whether this is Rock, Paper or Scissors.
    #[inline]
    pub fn is_playable(self) -> bool {
        self != Choice::Waiting
    }
}

// =============================================================================
// OUTCOME
// =============================================================================

/// Result of a round from one player's perspective.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Outcome {
    /// Lost the round (wire code 0)
    Lose = 0,
    /// Won the round (wire code 1)
    Win = 1,
    /// Same weapon on both sides (wire code 2)
    Tie = 2,
}

impl Outcome {
    /// Wire code for this outcome.
    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Decode a `RESULT` wire code.
    pub fn from_code(code: i32) -> Option<Outcome> {
        match code {
            0 => Some(Outcome::Lose),
            1 => Some(Outcome::Win),
            2 => Some(Outcome::Tie),
            _ => None,
        }
    }

    /// The same round seen from the other player.
    pub fn inverse(self) -> Outcome {
        match self {
            Outcome::Win => Outcome::Lose,
            Outcome::Lose => Outcome::Win,
            Outcome::Tie => Outcome::Tie,
        }
    }
}

/// Decide a round from the first player's perspective.
///
/// Returns `None` if either side is still `Waiting`.
///
/// ```text
/// local \ remote | Rock  Paper Scissors
/// ---------------+---------------------
/// Rock           | Tie   Lose  Win
/// Paper          | Win   Tie   Lose
/// Scissors       | Lose  Win   Tie
/// ```
pub fn rules(local: Choice, remote: Choice) -> Option<Outcome> {
    use Choice::*;

    let outcome = match (local, remote) {
        (Waiting, _) | (_, Waiting) => return None,
        (Rock, Rock) | (Paper, Paper) | (Scissors, Scissors) => Outcome::Tie,
        (Rock, Scissors) | (Paper, Rock) | (Scissors, Paper) => Outcome::Win,
        (Rock, Paper) | (Paper, Scissors) | (Scissors, Rock) => Outcome::Lose,
    };
    Some(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn playable() -> impl Strategy<Value = Choice> {
        prop::sample::select(Choice::PLAYABLE.to_vec())
    }

    #[test]
    fn test_rule_table() {
        use Choice::*;
        use Outcome::*;

        let table = [
            (Rock, Rock, Tie), (Rock, Paper, Lose), (Rock, Scissors, Win),
            (Paper, Rock, Win), (Paper, Paper, Tie), (Paper, Scissors, Lose),
            (Scissors, Rock, Lose), (Scissors, Paper, Win), (Scissors, Scissors, Tie),
        ];

        for (local, remote, expected) in table {
            assert_eq!(rules(local, remote), Some(expected), "{:?} vs {:?}", local, remote);
        }
    }

    #[test]
    fn test_waiting_never_resolves() {
        for c in Choice::PLAYABLE {
            assert_eq!(rules(Choice::Waiting, c), None);
            assert_eq!(rules(c, Choice::Waiting), None);
        }
        assert_eq!(rules(Choice::Waiting, Choice::Waiting), None);
    }

    #[test]
    fn test_wire_codes() {
        assert_eq!(Choice::Rock.code(), 0);
        assert_eq!(Choice::Paper.code(), 1);
        assert_eq!(Choice::Scissors.code(), 2);
        assert_eq!(Choice::Waiting.code(), 3);

        assert_eq!(Outcome::Lose.code(), 0);
        assert_eq!(Outcome::Win.code(), 1);
        assert_eq!(Outcome::Tie.code(), 2);
    }

    #[test]
    fn test_default_is_waiting() {
        assert_eq!(Choice::default(), Choice::Waiting);
    }

    #[test]
    fn test_playable_from_code_rejects_waiting_and_garbage() {
        assert_eq!(Choice::playable_from_code(1), Some(Choice::Paper));
        assert_eq!(Choice::playable_from_code(3), None);
        assert_eq!(Choice::playable_from_code(-1), None);
        assert_eq!(Choice::playable_from_code(42), None);
    }

    #[test]
    fn test_outcome_inverse() {
        assert_eq!(Outcome::Win.inverse(), Outcome::Lose);
        assert_eq!(Outcome::Lose.inverse(), Outcome::Win);
        assert_eq!(Outcome::Tie.inverse(), Outcome::Tie);
    }

    proptest! {
        #[test]
        fn prop_rules_antisymmetric(a in playable(), b in playable()) {
            let forward = rules(a, b).unwrap();
            let backward = rules(b, a).unwrap();
            if a == b {
                prop_assert_eq!(forward, Outcome::Tie);
                prop_assert_eq!(backward, Outcome::Tie);
            } else {
                prop_assert_ne!(forward, Outcome::Tie);
                prop_assert_eq!(forward, backward.inverse());
            }
        }

        #[test]
        fn prop_choice_code_roundtrip(a in playable()) {
            prop_assert_eq!(Choice::from_code(a.code()), Some(a));
        }
    }
}
