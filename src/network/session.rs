//! Match Session
//!
//! The match engine: owns [`SessionState`], applies local and remote choices,
//! reports results to the accessory and drives the presentation, including
//! the timed reveal after each round.
//!
//! The engine is plain `&mut self` code. Serialization of the two input
//! sources and the reveal timer is the host's job (see `network::host`).

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::game::choice::Choice;
use crate::game::state::{RoundResult, SessionState};
use crate::game::view::ScreenView;
use crate::network::presenter::Presenter;
use crate::network::protocol::{AppMessage, InboundMessage};
use crate::network::transport::Transport;

/// Unique session identifier.
pub type SessionId = [u8; 16];

/// Default time the outcome stays on screen.
pub const DEFAULT_REVEAL_MS: u64 = 5000;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// How long the outcome stays on screen before returning to idle.
    pub reveal_duration: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reveal_duration: Duration::from_millis(DEFAULT_REVEAL_MS),
        }
    }
}

impl EngineConfig {
    /// Create config from environment variables.
    ///
    /// `RPS_REVEAL_MS` overrides the reveal window; unparsable values are ignored.
    pub fn from_env() -> Self {
        let reveal_duration = std::env::var("RPS_REVEAL_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(DEFAULT_REVEAL_MS));

        Self { reveal_duration }
    }
}

/// Engine errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// `Waiting` is not something a player can submit.
    #[error("Invalid choice: {0:?}")]
    InvalidChoice(Choice),

    /// The local player already has a choice locked in this round.
    #[error("Local choice already locked in")]
    ChoiceLocked,

    /// The previous result is still on screen.
    #[error("Reveal in progress")]
    RevealInProgress,
}

/// A scheduled return to idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingReveal {
    deadline: Instant,
    generation: u64,
}

/// The match engine.
pub struct MatchEngine<T: Transport, P: Presenter> {
    /// Current session identifier.
    session_id: SessionId,
    /// Choices and tallies.
    state: SessionState,
    /// Engine configuration.
    config: EngineConfig,
    /// Link to the accessory.
    transport: T,
    /// Rendering collaborator.
    presenter: P,
    /// Reveal on screen, if any.
    reveal: Option<PendingReveal>,
    /// Bumped on every scheduled reveal; older deadlines never fire.
    reveal_generation: u64,
    /// Most recent resolution.
    last_result: Option<RoundResult>,
}

impl<T: Transport, P: Presenter> MatchEngine<T, P> {
    /// Create an engine. Call [`MatchEngine::start_session`] before play.
    pub fn new(config: EngineConfig, transport: T, presenter: P) -> Self {
        Self {
            session_id: new_session_id(),
            state: SessionState::new(),
            config,
            transport,
            presenter,
            reveal: None,
            reveal_generation: 0,
            last_result: None,
        }
    }

    /// Begin a new session (presentation came to the foreground).
    ///
    /// Clears tallies and choices, drops any pending reveal and renders idle.
    pub fn start_session(&mut self) -> SessionId {
        self.session_id = new_session_id();
        self.state.reset();
        self.reveal = None;
        self.last_result = None;

        info!("Session {} started", self.short_id());
        self.render();
        self.session_id
    }

    /// Local player picked a weapon.
    ///
    /// Input is disabled while a choice is locked in and while the last
    /// result is on screen; both are enforced here as well.
    pub fn submit_local_choice(&mut self, choice: Choice) -> Result<Option<RoundResult>, EngineError> {
        if !choice.is_playable() {
            return Err(EngineError::InvalidChoice(choice));
        }
        if self.state.local_pending() {
            return Err(EngineError::ChoiceLocked);
        }
        if self.reveal.is_some() {
            return Err(EngineError::RevealInProgress);
        }

        debug!("Session {} local choice {:?}", self.short_id(), choice);
        match self.state.set_local(choice) {
            Some(result) => {
                self.on_resolved(result.clone());
                Ok(Some(result))
            }
            None => {
                self.render();
                Ok(None)
            }
        }
    }

    /// A message arrived from the accessory.
    ///
    /// Always acknowledged. A missing or unplayable `CHOICE` is a no-op.
    pub fn receive_remote_choice(&mut self, message: &InboundMessage) -> Option<RoundResult> {
        if let Err(e) = self.transport.ack(message.transaction_id) {
            warn!("Session {} failed to ack {}: {}", self.short_id(), message.transaction_id, e);
        }

        let Some(choice) = message.payload.read_choice() else {
            debug!(
                "Session {} ignoring message {} without a playable choice: {}",
                self.short_id(),
                message.transaction_id,
                message.payload.to_json().unwrap_or_default()
            );
            return None;
        };

        debug!("Session {} remote choice {:?}", self.short_id(), choice);
        let result = self.state.set_remote(choice)?;
        self.on_resolved(result.clone());
        Some(result)
    }

    /// Deadline and generation of the reveal on screen, if any.
    pub fn pending_reveal(&self) -> Option<(Instant, u64)> {
        self.reveal.map(|r| (r.deadline, r.generation))
    }

    /// End the reveal window and render the live state.
    ///
    /// Returns `false` if no reveal was pending.
    pub fn finish_reveal(&mut self) -> bool {
        match self.reveal.take() {
            Some(reveal) => {
                debug!("Session {} reveal {} finished", self.short_id(), reveal.generation);
                self.render();
                true
            }
            None => false,
        }
    }

    /// End the reveal only if it is still the one scheduled as `generation`.
    pub fn finish_reveal_if_current(&mut self, generation: u64) -> bool {
        match self.reveal {
            Some(reveal) if reveal.generation == generation => self.finish_reveal(),
            _ => false,
        }
    }

    /// What the screen should show right now.
    pub fn current_view(&self) -> ScreenView {
        match (&self.reveal, &self.last_result) {
            (Some(_), Some(result)) => ScreenView::reveal(result),
            _ => ScreenView::derive(&self.state),
        }
    }

    /// Current session state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Current session identifier.
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Most recent round result in this session.
    pub fn last_result(&self) -> Option<&RoundResult> {
        self.last_result.as_ref()
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Access the presenter (toasts from outside the game flow).
    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    fn on_resolved(&mut self, result: RoundResult) {
        info!(
            "Session {} round {}: {:?} vs {:?} -> {:?} ({} of {})",
            self.short_id(),
            result.rounds_played,
            result.local_choice,
            result.remote_choice,
            result.outcome,
            result.rounds_won,
            result.rounds_played,
        );

        let message = AppMessage::result(result.remote_outcome());
        debug!("Session {} sending {}", self.short_id(), message.to_json().unwrap_or_default());
        if let Err(e) = self.transport.send(message) {
            warn!("Session {} failed to send result: {}", self.short_id(), e);
        }

        self.reveal_generation += 1;
        self.reveal = Some(PendingReveal {
            deadline: Instant::now() + self.config.reveal_duration,
            generation: self.reveal_generation,
        });
        self.last_result = Some(result);
        self.render();
    }

    fn render(&mut self) {
        let view = self.current_view();
        self.presenter.render(&view);
    }

    fn short_id(&self) -> String {
        hex::encode(&self.session_id[..4])
    }
}

fn new_session_id() -> SessionId {
    uuid::Uuid::new_v4().into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::choice::Outcome;
    use crate::game::view::ImageId;
    use crate::network::presenter::{ChannelPresenter, PresenterEvent};
    use crate::network::protocol::{OutboundFrame, KEY_CHOICE, KEY_RESULT};
    use crate::network::transport::ChannelTransport;
    use tokio::sync::mpsc::UnboundedReceiver;

    type TestEngine = MatchEngine<ChannelTransport, ChannelPresenter>;

    fn create_test_engine() -> (TestEngine, UnboundedReceiver<OutboundFrame>, UnboundedReceiver<PresenterEvent>) {
        let (transport, frames) = ChannelTransport::new();
        let (presenter, views) = ChannelPresenter::new();
        let mut engine = MatchEngine::new(EngineConfig::default(), transport, presenter);
        engine.start_session();
        (engine, frames, views)
    }

    fn remote(transaction_id: u8, choice: Choice) -> InboundMessage {
        InboundMessage::new(transaction_id, AppMessage::choice(choice))
    }

    fn drain<X>(rx: &mut UnboundedReceiver<X>) -> Vec<X> {
        let mut out = Vec::new();
        while let Ok(x) = rx.try_recv() {
            out.push(x);
        }
        out
    }

    fn results(frames: &[OutboundFrame]) -> Vec<i32> {
        frames.iter()
            .filter_map(|f| match f {
                OutboundFrame::Message(m) => m.get(KEY_RESULT),
                _ => None,
            })
            .collect()
    }

    fn acks(frames: &[OutboundFrame]) -> Vec<u8> {
        frames.iter()
            .filter_map(|f| match f {
                OutboundFrame::Ack { transaction_id } => Some(*transaction_id),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_start_session_renders_idle() {
        let (_engine, _frames, mut views) = create_test_engine();
        assert_eq!(drain(&mut views), vec![PresenterEvent::Render(ScreenView::idle())]);
    }

    #[test]
    fn test_local_rock_remote_scissors() {
        let (mut engine, mut frames, mut views) = create_test_engine();
        drain(&mut views);

        assert_eq!(engine.submit_local_choice(Choice::Rock), Ok(None));
        assert_eq!(
            drain(&mut views),
            vec![PresenterEvent::Render(ScreenView::waiting(Choice::Rock))],
        );

        let result = engine.receive_remote_choice(&remote(1, Choice::Scissors)).unwrap();
        assert_eq!(result.outcome, Outcome::Win);
        assert_eq!(engine.state().rounds_won, 1);
        assert_eq!(engine.state().rounds_played, 1);

        let frames = drain(&mut frames);
        assert_eq!(acks(&frames), vec![1]);
        assert_eq!(results(&frames), vec![Outcome::Lose.code()]);

        let views = drain(&mut views);
        assert_eq!(views.len(), 1);
        if let PresenterEvent::Render(view) = &views[0] {
            assert_eq!(view.instruction_text, "You win! (1 of 1)");
            assert_eq!(view.image, ImageId::Rock);
            assert!(!view.input_enabled);
        } else {
            panic!("Expected render");
        }
    }

    #[test]
    fn test_remote_paper_then_local_rock() {
        let (mut engine, mut frames, mut views) = create_test_engine();
        drain(&mut views);

        assert!(engine.receive_remote_choice(&remote(3, Choice::Paper)).is_none());
        assert!(drain(&mut views).is_empty());

        let result = engine.submit_local_choice(Choice::Rock).unwrap().unwrap();
        assert_eq!(result.outcome, Outcome::Lose);
        assert_eq!(engine.state().rounds_won, 0);
        assert_eq!(engine.state().rounds_played, 1);
        assert_eq!(results(&drain(&mut frames)), vec![Outcome::Win.code()]);

        // Resolution fired immediately: no waiting frame in between.
        let views = drain(&mut views);
        assert_eq!(views.len(), 1);
        assert!(matches!(&views[0], PresenterEvent::Render(v) if v.instruction_text == "You lose!"));
    }

    #[test]
    fn test_scissors_tie() {
        let (mut engine, mut frames, _views) = create_test_engine();

        engine.submit_local_choice(Choice::Scissors).unwrap();
        let result = engine.receive_remote_choice(&remote(0, Choice::Scissors)).unwrap();

        assert_eq!(result.outcome, Outcome::Tie);
        assert_eq!(engine.state().rounds_won, 0);
        assert_eq!(engine.state().rounds_played, 1);
        assert_eq!(results(&drain(&mut frames)), vec![Outcome::Tie.code()]);
    }

    #[test]
    fn test_waiting_rejected() {
        let (mut engine, _frames, _views) = create_test_engine();
        assert_eq!(
            engine.submit_local_choice(Choice::Waiting),
            Err(EngineError::InvalidChoice(Choice::Waiting)),
        );
    }

    #[test]
    fn test_second_local_choice_locked() {
        let (mut engine, _frames, _views) = create_test_engine();
        engine.submit_local_choice(Choice::Paper).unwrap();
        assert_eq!(engine.submit_local_choice(Choice::Rock), Err(EngineError::ChoiceLocked));
        assert_eq!(engine.state().local_choice, Choice::Paper);
    }

    #[test]
    fn test_malformed_messages_acked_and_ignored() {
        let (mut engine, mut frames, _views) = create_test_engine();
        engine.submit_local_choice(Choice::Rock).unwrap();

        let malformed = [
            InboundMessage::new(10, AppMessage::new()),
            InboundMessage::new(11, AppMessage::with(KEY_CHOICE, 3)),
            InboundMessage::new(12, AppMessage::with(KEY_CHOICE, -7)),
            InboundMessage::new(13, AppMessage::with(KEY_RESULT, 1)),
        ];
        for msg in &malformed {
            assert!(engine.receive_remote_choice(msg).is_none());
        }

        assert_eq!(engine.state().rounds_played, 0);
        assert_eq!(engine.state().local_choice, Choice::Rock);

        let frames = drain(&mut frames);
        assert_eq!(acks(&frames), vec![10, 11, 12, 13]);
        assert!(results(&frames).is_empty());
    }

    #[test]
    fn test_repeated_remote_choice_overwrites() {
        let (mut engine, _frames, _views) = create_test_engine();
        engine.receive_remote_choice(&remote(1, Choice::Rock));
        engine.receive_remote_choice(&remote(2, Choice::Scissors));

        let result = engine.submit_local_choice(Choice::Rock).unwrap().unwrap();
        assert_eq!(result.remote_choice, Choice::Scissors);
        assert_eq!(result.outcome, Outcome::Win);
    }

    #[test]
    fn test_new_session_resets_tallies() {
        let (mut engine, _frames, _views) = create_test_engine();
        for tid in 0..3 {
            engine.submit_local_choice(Choice::Paper).unwrap();
            engine.receive_remote_choice(&remote(tid, Choice::Rock));
            engine.finish_reveal();
        }
        engine.submit_local_choice(Choice::Rock).unwrap();
        assert_eq!(engine.state().rounds_won, 3);

        let old_id = engine.session_id();
        let new_id = engine.start_session();

        assert_ne!(old_id, new_id);
        assert_eq!(engine.state(), &SessionState::new());
        assert!(engine.pending_reveal().is_none());
        assert!(engine.last_result().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_deadline_uses_config() {
        let (transport, _frames) = ChannelTransport::new();
        let (presenter, _views) = ChannelPresenter::new();
        let config = EngineConfig { reveal_duration: Duration::from_millis(250) };
        let mut engine = MatchEngine::new(config, transport, presenter);
        engine.start_session();

        let before = Instant::now();
        engine.submit_local_choice(Choice::Rock).unwrap();
        engine.receive_remote_choice(&remote(0, Choice::Rock));

        let (deadline, _) = engine.pending_reveal().unwrap();
        assert_eq!(deadline, before + Duration::from_millis(250));
    }

    #[test]
    fn test_finish_reveal_returns_to_idle() {
        let (mut engine, _frames, mut views) = create_test_engine();
        engine.submit_local_choice(Choice::Rock).unwrap();
        engine.receive_remote_choice(&remote(0, Choice::Paper));
        drain(&mut views);

        assert!(engine.finish_reveal());
        assert_eq!(drain(&mut views), vec![PresenterEvent::Render(ScreenView::idle())]);

        // Nothing pending any more.
        assert!(!engine.finish_reveal());
        assert!(drain(&mut views).is_empty());
    }

    #[test]
    fn test_local_choice_rejected_during_reveal() {
        let (mut engine, mut frames, mut views) = create_test_engine();
        engine.submit_local_choice(Choice::Rock).unwrap();
        engine.receive_remote_choice(&remote(0, Choice::Paper));
        drain(&mut frames);
        drain(&mut views);

        assert_eq!(engine.submit_local_choice(Choice::Scissors), Err(EngineError::RevealInProgress));
        assert_eq!(engine.state().local_choice, Choice::Waiting);
        assert!(engine.pending_reveal().is_some());
        assert!(drain(&mut frames).is_empty());
        assert!(drain(&mut views).is_empty());

        engine.finish_reveal();
        assert_eq!(engine.submit_local_choice(Choice::Scissors), Ok(None));
    }

    #[test]
    fn test_stale_generation_does_not_end_reveal() {
        let (mut engine, _frames, mut views) = create_test_engine();

        engine.receive_remote_choice(&remote(0, Choice::Rock));
        engine.submit_local_choice(Choice::Paper).unwrap();
        let (_, first) = engine.pending_reveal().unwrap();
        engine.finish_reveal();

        engine.receive_remote_choice(&remote(1, Choice::Rock));
        engine.submit_local_choice(Choice::Rock).unwrap();
        let (_, second) = engine.pending_reveal().unwrap();
        drain(&mut views);

        assert!(second > first);
        assert!(!engine.finish_reveal_if_current(first));
        assert!(drain(&mut views).is_empty());
        assert_eq!(engine.current_view().instruction_text, "It's a tie!");
        assert!(engine.finish_reveal_if_current(second));
        assert_eq!(drain(&mut views), vec![PresenterEvent::Render(ScreenView::idle())]);
    }

    #[test]
    fn test_session_start_drops_reveal() {
        let (mut engine, _frames, mut views) = create_test_engine();
        engine.submit_local_choice(Choice::Rock).unwrap();
        engine.receive_remote_choice(&remote(0, Choice::Paper));
        let (_, stale) = engine.pending_reveal().unwrap();

        engine.start_session();
        engine.submit_local_choice(Choice::Scissors).unwrap();
        drain(&mut views);

        // The old expiry must not force idle mid-round.
        assert!(!engine.finish_reveal_if_current(stale));
        assert!(drain(&mut views).is_empty());
        assert_eq!(engine.current_view(), ScreenView::waiting(Choice::Scissors));
    }

    #[test]
    fn test_remote_during_reveal_keeps_reveal() {
        let (mut engine, _frames, mut views) = create_test_engine();
        engine.submit_local_choice(Choice::Rock).unwrap();
        engine.receive_remote_choice(&remote(0, Choice::Scissors));
        drain(&mut views);

        assert!(engine.receive_remote_choice(&remote(1, Choice::Paper)).is_none());
        assert!(drain(&mut views).is_empty());
        assert_eq!(engine.current_view().instruction_text, "You win! (1 of 1)");
        assert_eq!(engine.state().remote_choice, Choice::Paper);
    }

    #[test]
    fn test_closed_transport_is_not_fatal() {
        let (transport, frames) = ChannelTransport::new();
        let (presenter, _views) = ChannelPresenter::new();
        let mut engine = MatchEngine::new(EngineConfig::default(), transport, presenter);
        engine.start_session();
        drop(frames);

        engine.submit_local_choice(Choice::Paper).unwrap();
        let result = engine.receive_remote_choice(&remote(0, Choice::Rock));
        assert!(result.is_some());
        assert_eq!(engine.state().rounds_won, 1);
    }

    #[test]
    fn test_engine_config_default() {
        assert_eq!(EngineConfig::default().reveal_duration, Duration::from_secs(5));
    }
}
