//! Boundary Layer
//!
//! Everything between the pure game logic and the outside world: the
//! accessory wire format and transport, the presenter, the match engine and
//! the host loop that serializes their events.

pub mod accessory;
pub mod host;
pub mod loopback;
pub mod presenter;
pub mod protocol;
pub mod session;
pub mod transport;

pub use accessory::AccessoryState;
pub use host::{CompanionHost, HostError, HostEvent, HostHandle, LocalInput};
pub use loopback::LoopbackAccessory;
pub use presenter::{ChannelPresenter, LogPresenter, Presenter, PresenterEvent};
pub use protocol::{AppMessage, InboundMessage, OutboundFrame, TransactionId, KEY_CHOICE, KEY_RESULT};
pub use session::{EngineConfig, EngineError, MatchEngine, SessionId};
pub use transport::{ChannelTransport, Transport, TransportError};
