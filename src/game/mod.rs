//! Game Logic Module
//!
//! Pure rock-paper-scissors rules and session bookkeeping. No I/O, no clocks.
//!
//! ## Module Structure
//!
//! - `choice`: Choice and outcome enums, wire codes, the rule table
//! - `state`: Session state and round resolution
//! - `view`: Screen view derivation for the presentation layer

pub mod choice;
pub mod state;
pub mod view;

// Re-export key types
pub use choice::{rules, Choice, Outcome};
pub use state::{RoundResult, SessionState};
pub use view::{ImageId, ScreenView};
