//! Presentation Collaborator
//!
//! Receives a [`ScreenView`] on every state change, plus user-facing toasts.

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::game::view::ScreenView;

/// Rendering side of the companion app.
pub trait Presenter: Send {
    /// Show a new frame.
    fn render(&mut self, view: &ScreenView);

    /// Show a short, non-blocking notice.
    fn toast(&mut self, message: &str);
}

/// Something the presenter was asked to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterEvent {
    /// A full frame.
    Render(ScreenView),
    /// A toast notice.
    Toast(String),
}

/// Presenter that forwards every request over a channel.
#[derive(Debug, Clone)]
pub struct ChannelPresenter {
    tx: mpsc::UnboundedSender<PresenterEvent>,
}

impl ChannelPresenter {
    /// Create the presenter and the receiver the UI drains.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PresenterEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Presenter for ChannelPresenter {
    fn render(&mut self, view: &ScreenView) {
        // A closed UI is not the engine's problem.
        let _ = self.tx.send(PresenterEvent::Render(view.clone()));
    }

    fn toast(&mut self, message: &str) {
        let _ = self.tx.send(PresenterEvent::Toast(message.to_string()));
    }
}

/// Presenter that writes frames to the log.
#[derive(Debug, Clone, Default)]
pub struct LogPresenter {
    label: &'static str,
}

impl LogPresenter {
    /// Log presenter tagged with `label`.
    pub fn new(label: &'static str) -> Self {
        Self { label }
    }
}

impl Presenter for LogPresenter {
    fn render(&mut self, view: &ScreenView) {
        info!(
            screen = self.label,
            image = ?view.image,
            input_enabled = view.input_enabled,
            "{}",
            view.instruction_text
        );
    }

    fn toast(&mut self, message: &str) {
        warn!(screen = self.label, "toast: {}", message);
    }
}
