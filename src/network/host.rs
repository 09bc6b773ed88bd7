//! Companion Host
//!
//! The single logical thread of control. One tokio task owns the
//! [`MatchEngine`] and serializes local input, inbound accessory messages,
//! the reveal timer and shutdown, so no event ever sees a half-updated
//! session.
//!
//! Local input and accessory messages share one queue, so events from the
//! same producer are applied in the order they were sent. Sideloading runs
//! on its own task and reports back through a separate channel.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, instrument, warn};

use crate::game::choice::Choice;
use crate::game::state::SessionState;
use crate::install::sideload::{self, Installer, SideloadConfig, SideloadError};
use crate::network::presenter::Presenter;
use crate::network::protocol::InboundMessage;
use crate::network::session::{EngineConfig, EngineError, MatchEngine};
use crate::network::transport::Transport;

/// Capacity of the host's event queue.
const QUEUE_CAPACITY: usize = 64;

/// Events raised by the presentation layer.
#[derive(Debug)]
pub enum LocalInput {
    /// The app came to the foreground; start a fresh session.
    SessionStart,
    /// The local player pressed a weapon.
    Choose(Choice),
    /// The user asked to install the accessory app.
    InstallCompanion,
    /// Read the session state (tests, diagnostics).
    Snapshot(oneshot::Sender<SessionState>),
}

/// Everything the host loop consumes from its handles.
#[derive(Debug)]
pub enum HostEvent {
    /// Presentation-layer input.
    Local(LocalInput),
    /// Message delivered by the accessory transport.
    Inbound(InboundMessage),
}

/// Host errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The host task has stopped.
    #[error("Host closed")]
    Closed,
}

/// Cloneable handle for feeding events into the host from any thread.
#[derive(Debug, Clone)]
pub struct HostHandle {
    events_tx: mpsc::Sender<HostEvent>,
    shutdown_tx: broadcast::Sender<()>,
}

impl HostHandle {
    async fn send(&self, event: HostEvent) -> Result<(), HostError> {
        self.events_tx.send(event).await.map_err(|_| HostError::Closed)
    }

    /// Forward a local UI event.
    pub async fn local(&self, input: LocalInput) -> Result<(), HostError> {
        self.send(HostEvent::Local(input)).await
    }

    /// Start a new session.
    pub async fn start_session(&self) -> Result<(), HostError> {
        self.local(LocalInput::SessionStart).await
    }

    /// Submit the local player's choice.
    pub async fn choose(&self, choice: Choice) -> Result<(), HostError> {
        self.local(LocalInput::Choose(choice)).await
    }

    /// Ask for the accessory app to be sideloaded.
    pub async fn install_companion(&self) -> Result<(), HostError> {
        self.local(LocalInput::InstallCompanion).await
    }

    /// Deliver a message from the accessory.
    pub async fn inbound(&self, message: InboundMessage) -> Result<(), HostError> {
        self.send(HostEvent::Inbound(message)).await
    }

    /// Read the current session state.
    pub async fn snapshot(&self) -> Result<SessionState, HostError> {
        let (tx, rx) = oneshot::channel();
        self.local(LocalInput::Snapshot(tx)).await?;
        rx.await.map_err(|_| HostError::Closed)
    }

    /// Stop the host loop.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

type InstallOutcome = Result<PathBuf, SideloadError>;

/// The host: engine plus its event queues.
pub struct CompanionHost<T: Transport, P: Presenter, I: Installer> {
    engine: MatchEngine<T, P>,
    installer: Arc<I>,
    sideload_config: SideloadConfig,
    install_running: bool,
    events_rx: mpsc::Receiver<HostEvent>,
    install_tx: mpsc::UnboundedSender<InstallOutcome>,
    install_rx: mpsc::UnboundedReceiver<InstallOutcome>,
    shutdown_rx: broadcast::Receiver<()>,
}

impl<T: Transport, P: Presenter, I: Installer + 'static> CompanionHost<T, P, I> {
    /// Create a host and the handle used to drive it.
    pub fn new(
        config: EngineConfig,
        sideload_config: SideloadConfig,
        transport: T,
        presenter: P,
        installer: I,
    ) -> (Self, HostHandle) {
        let (events_tx, events_rx) = mpsc::channel(QUEUE_CAPACITY);
        let (install_tx, install_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let host = Self {
            engine: MatchEngine::new(config, transport, presenter),
            installer: Arc::new(installer),
            sideload_config,
            install_running: false,
            events_rx,
            install_tx,
            install_rx,
            shutdown_rx,
        };
        let handle = HostHandle { events_tx, shutdown_tx };

        (host, handle)
    }

    /// Run until shutdown or until every handle is dropped.
    ///
    /// Returns the engine so callers can inspect the final state.
    #[instrument(skip(self))]
    pub async fn run(mut self) -> MatchEngine<T, P> {
        info!("Companion host running");

        loop {
            let pending = self.engine.pending_reveal();
            let reveal_pending = pending.is_some();
            let (reveal_at, generation) = pending.unwrap_or_else(|| (Instant::now(), 0));

            // An expired reveal is handled before any queued input.
            tokio::select! {
                biased;

                _ = self.shutdown_rx.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
                _ = sleep_until(reveal_at), if reveal_pending => {
                    self.engine.finish_reveal_if_current(generation);
                }
                event = self.events_rx.recv() => {
                    match event {
                        Some(HostEvent::Local(input)) => self.handle_local(input),
                        Some(HostEvent::Inbound(message)) => {
                            self.engine.receive_remote_choice(&message);
                        }
                        None => {
                            info!("All host handles dropped");
                            break;
                        }
                    }
                }
                Some(outcome) = self.install_rx.recv() => {
                    self.on_install_finished(outcome);
                }
            }
        }

        self.engine
    }

    fn handle_local(&mut self, input: LocalInput) {
        match input {
            LocalInput::SessionStart => {
                self.engine.start_session();
            }
            LocalInput::Choose(choice) => match self.engine.submit_local_choice(choice) {
                Ok(_) => {}
                Err(EngineError::ChoiceLocked) => {
                    debug!("Ignoring {:?}: choice already locked in", choice);
                }
                Err(EngineError::RevealInProgress) => {
                    debug!("Ignoring {:?}: result still on screen", choice);
                }
                Err(e) => {
                    warn!("Rejected local choice: {}", e);
                }
            },
            LocalInput::InstallCompanion => self.spawn_install(),
            LocalInput::Snapshot(reply) => {
                let _ = reply.send(self.engine.state().clone());
            }
        }
    }

    fn spawn_install(&mut self) {
        if self.install_running {
            debug!("Install already in progress");
            return;
        }
        self.install_running = true;

        let installer = Arc::clone(&self.installer);
        let config = self.sideload_config.clone();
        let done = self.install_tx.clone();

        tokio::spawn(async move {
            let outcome = sideload::install(&config, installer.as_ref()).await;
            let _ = done.send(outcome);
        });
    }

    fn on_install_finished(&mut self, outcome: InstallOutcome) {
        self.install_running = false;
        match outcome {
            Ok(path) => info!("Accessory app handed off from {}", path.display()),
            Err(e) => {
                // The toast is the only place this failure surfaces.
                error!("Sideload failed: {}", e);
                self.engine.presenter_mut().toast(&sideload::failure_text(&e));
            }
        }
    }
}
