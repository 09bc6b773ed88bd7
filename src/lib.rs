//! # Rock-Paper-Scissors Companion
//!
//! Phone-side match engine for a two-player rock-paper-scissors game played
//! against a wrist-worn accessory.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  RPS COMPANION                               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/            - Integrity primitives                     │
//! │  └── hash.rs      - SHA-256 bundle digests                   │
//! │                                                              │
//! │  game/            - Game logic (pure)                        │
//! │  ├── choice.rs    - Choices, outcomes, rule table            │
//! │  ├── state.rs     - Session state and round resolution       │
//! │  └── view.rs      - Screen view derivation                   │
//! │                                                              │
//! │  network/         - Boundary (transport, UI, event loop)     │
//! │  ├── protocol.rs  - Flat key/int wire messages               │
//! │  ├── transport.rs - Accessory transport trait                │
//! │  ├── presenter.rs - Presentation trait                       │
//! │  ├── session.rs   - Match engine                             │
//! │  ├── host.rs      - Single-task event loop                   │
//! │  ├── accessory.rs - Wrist-side peer state                    │
//! │  └── loopback.rs  - In-process accessory link                │
//! │                                                              │
//! │  install/         - Accessory app sideloading                │
//! │  └── sideload.rs  - Copy, verify, hand off                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering
//!
//! Local presses and accessory messages may arrive in any order and from any
//! thread. The host funnels both into one task, so a round resolves exactly
//! once, when the second choice lands, and both choices are cleared in the
//! same step.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod install;
pub mod network;

// Re-export commonly used types
pub use game::choice::{rules, Choice, Outcome};
pub use game::state::{RoundResult, SessionState};
pub use game::view::{ImageId, ScreenView};
pub use network::host::{CompanionHost, HostHandle};
pub use network::session::{EngineConfig, MatchEngine};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
