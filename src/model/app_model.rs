//! Main application model with state management

use std::time::Instant;

use tokio::sync::{mpsc, watch};

use crate::auth::SessionEvent;
use super::playback::{PlaybackInfo, PlaybackMachine};
use super::track::Track;

const ERROR_AUTO_CLEAR_SECS: u64 = 5;

/// UI state outside the playback machine.
pub struct UiState {
    pub selected: usize,
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
    pub server_name: String,
    pub username: String,
    pub should_quit: bool,
}

/// Main application model. Guarded by one `Arc<Mutex<..>>` at the call sites;
/// every state mutation ends with [`publish`] so observers see each change.
///
/// [`publish`]: AppModel::publish
pub struct AppModel {
    pub machine: PlaybackMachine,
    pub queue: Vec<Track>,
    pub ui: UiState,
    playback_tx: watch::Sender<PlaybackInfo>,
    session_tx: mpsc::UnboundedSender<SessionEvent>,
}

impl AppModel {
    pub fn new(
        queue: Vec<Track>,
        server_name: String,
        username: String,
        playback_tx: watch::Sender<PlaybackInfo>,
        session_tx: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            machine: PlaybackMachine::new(),
            queue,
            ui: UiState {
                selected: 0,
                error_message: None,
                error_timestamp: None,
                server_name,
                username,
                should_quit: false,
            },
            playback_tx,
            session_tx,
        }
    }

    /// Push the current playback snapshot to observers.
    pub fn publish(&self) {
        let _ = self.playback_tx.send(self.machine.snapshot());
    }

    /// Notify the session boundary that the credential was rejected. The
    /// session manager decides what to do; stored credentials are untouched
    /// here.
    pub fn notify_session_expired(&self) {
        tracing::warn!("credential rejected, notifying session boundary");
        let _ = self.session_tx.send(SessionEvent::Expired);
    }

    // ------------------------------------------------------------------
    // Selection cursor
    // ------------------------------------------------------------------

    pub fn move_selection_up(&mut self) {
        self.ui.selected = self.ui.selected.saturating_sub(1);
    }

    pub fn move_selection_down(&mut self) {
        if !self.queue.is_empty() {
            self.ui.selected = (self.ui.selected + 1).min(self.queue.len() - 1);
        }
    }

    pub fn selected_track(&self) -> Option<Track> {
        self.queue.get(self.ui.selected).cloned()
    }

    /// Keep the cursor valid after the queue changed.
    pub fn clamp_selection(&mut self) {
        if self.queue.is_empty() {
            self.ui.selected = 0;
        } else {
            self.ui.selected = self.ui.selected.min(self.queue.len() - 1);
        }
    }

    // ------------------------------------------------------------------
    // Error banner
    // ------------------------------------------------------------------

    pub fn set_error(&mut self, message: String) {
        tracing::error!(%message, "user-visible error");
        self.ui.error_message = Some(message);
        self.ui.error_timestamp = Some(Instant::now());
    }

    pub fn clear_error(&mut self) {
        self.ui.error_message = None;
        self.ui.error_timestamp = None;
    }

    pub fn has_error(&self) -> bool {
        self.ui.error_message.is_some()
    }

    pub fn auto_clear_old_errors(&mut self) {
        if let Some(ts) = self.ui.error_timestamp {
            if ts.elapsed().as_secs() >= ERROR_AUTO_CLEAR_SECS {
                self.clear_error();
            }
        }
    }
}
