//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (formatting, truncation)
//! - `layout`: Header and catalog table
//! - `progress`: Transport bar rendering
//! - `overlays`: Error notification overlay

mod layout;
mod overlays;
mod progress;
mod utils;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::model::{PlaybackInfo, Track, UiState};

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, playback: &PlaybackInfo, ui_state: &UiState, queue: &[Track]) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header: server, user, key hints
                Constraint::Min(0),    // Song catalog
                Constraint::Length(3), // Transport bar
            ])
            .split(frame.area());

        layout::render_header(frame, chunks[0], ui_state);
        layout::render_song_table(frame, chunks[1], ui_state, queue, playback);
        progress::render_transport_bar(frame, chunks[2], playback);

        if ui_state.error_message.is_some() {
            overlays::render_error_notification(frame, ui_state);
        }
    }
}
