//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        // An error banner blocks everything except dismissing it.
        {
            let mut model = self.model.lock().await;
            if model.has_error() {
                if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                    model.clear_error();
                }
                return Ok(());
            }
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                let mut model = self.model.lock().await;
                model.ui.should_quit = true;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                let mut model = self.model.lock().await;
                model.move_selection_up();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let mut model = self.model.lock().await;
                model.move_selection_down();
            }
            KeyCode::Enter => {
                let track = {
                    let model = self.model.lock().await;
                    model.selected_track()
                };
                if let Some(track) = track {
                    self.select_track(track, true).await;
                }
            }
            KeyCode::Char(' ') => self.toggle_playback().await,
            KeyCode::Char('n') => self.next_track(true).await,
            KeyCode::Char('p') => self.previous_track().await,
            KeyCode::Right => self.seek_forward().await,
            KeyCode::Left => self.seek_backward().await,
            KeyCode::Char('+') | KeyCode::Char('=') => self.volume_up().await,
            KeyCode::Char('-') => self.volume_down().await,
            KeyCode::Char('m') => self.toggle_mute().await,
            KeyCode::Char('r') => self.refresh_catalog().await,
            _ => {}
        }

        Ok(())
    }
}
