//! Selection, transport and queue navigation

use std::time::Duration;

use crate::model::queue::{self, PreviousAction};
use crate::model::{PlaybackState, StreamError, Track};

use super::AppController;

/// Seconds moved per arrow-key seek.
const SEEK_STEP_SECS: f64 = 5.0;
/// Volume moved per volume key, against a 0.0..=0.6 range.
const VOLUME_STEP: f32 = 0.05;

impl AppController {
    /// Make `track` the selection target: release the outgoing handle, fetch
    /// the new bytes, bind them and move the machine through
    /// Loading -> Ready. Release and acquire are transactional from the
    /// caller's point of view even though the fetch itself is asynchronous.
    pub async fn select_track(&self, track: Track, autoplay: bool) {
        tracing::info!(track_id = track.id, title = %track.title, autoplay, "selecting track");

        {
            let mut model = self.model.lock().await;
            model.machine.begin_loading(track.clone());
            model.publish();
        }

        // Old binding and handle go away before the new fetch starts.
        self.release_current().await;

        let handle = match self.loader.acquire(track.id, &self.credential).await {
            Ok(handle) => handle,
            Err(StreamError::Superseded) => {
                // A newer selection owns the state now; this result is
                // discarded without touching machine or renderer.
                tracing::debug!(track_id = track.id, "acquire superseded, discarding");
                return;
            }
            Err(e) => {
                let mut model = self.model.lock().await;
                model.machine.load_failed();
                model.set_error(Self::format_error(&e));
                if matches!(e, StreamError::Auth) {
                    model.notify_session_expired();
                }
                model.publish();
                return;
            }
        };

        // The fetch may have resolved after yet another selection was made
        // between our awaits; only the current target may bind.
        {
            let model = self.model.lock().await;
            if model.machine.track().map(|t| t.id) != Some(track.id) {
                tracing::debug!(track_id = track.id, "selection changed during fetch, discarding");
                return;
            }
        }

        match self.renderer.bind(handle.bytes()).await {
            Ok(duration) => {
                let mut model = self.model.lock().await;
                // Re-check under the lock: a selection made while the bind
                // was in flight owns the renderer now.
                if model.machine.track().map(|t| t.id) != Some(track.id) {
                    tracing::debug!(track_id = handle.track_id(), "selection changed during bind, unbinding");
                    drop(handle);
                    self.renderer.unbind();
                    return;
                }
                *self.current_handle.lock().await = Some(handle);
                // Renderer metadata wins; the catalog estimate only fills in
                // when the decoder reports nothing.
                model.machine.loaded(duration.or(track.estimated_duration()));
                model.publish();
            }
            Err(e) => {
                drop(handle);
                let mut model = self.model.lock().await;
                model.machine.load_failed();
                model.set_error(format!("Cannot play this track: {e}"));
                model.publish();
                return;
            }
        }

        if autoplay {
            self.play().await;
        }
    }

    pub async fn toggle_playback(&self) {
        let playing = {
            let model = self.model.lock().await;
            model.machine.state() == PlaybackState::Playing
        };
        if playing {
            self.pause().await;
        } else {
            self.play().await;
        }
    }

    /// No-op unless Ready or Paused. The renderer is started first; if the
    /// platform refuses, the state keeps its pre-call value and the refusal
    /// is only logged.
    pub async fn play(&self) {
        {
            let model = self.model.lock().await;
            if !model.machine.can_play() {
                tracing::debug!(state = ?model.machine.state(), "play ignored in this state");
                return;
            }
        }

        match self.renderer.play().await {
            Ok(()) => {
                let mut model = self.model.lock().await;
                if model.machine.can_play() {
                    model.machine.confirm_play();
                    model.publish();
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "renderer rejected play, state unchanged");
            }
        }
    }

    /// No-op unless Playing.
    pub async fn pause(&self) {
        let mut model = self.model.lock().await;
        if !model.machine.can_pause() {
            tracing::debug!(state = ?model.machine.state(), "pause ignored in this state");
            return;
        }
        self.renderer.pause();
        model.machine.confirm_pause();
        model.publish();
    }

    /// Seek relative to the current position; the machine clamps the target
    /// into [0, duration] and rejects it when no duration is known.
    pub async fn seek_by(&self, delta_secs: f64) {
        let mut model = self.model.lock().await;
        let target = model.machine.position() + delta_secs;
        if let Some(clamped) = model.machine.seek(target) {
            self.renderer.seek(Duration::from_secs_f64(clamped));
            model.publish();
        }
    }

    pub async fn seek_forward(&self) {
        self.seek_by(SEEK_STEP_SECS).await;
    }

    pub async fn seek_backward(&self) {
        self.seek_by(-SEEK_STEP_SECS).await;
    }

    pub async fn volume_up(&self) {
        let mut model = self.model.lock().await;
        let target = model.machine.volume() + VOLUME_STEP;
        let applied = model.machine.set_volume(target);
        self.renderer.set_volume(applied);
        model.publish();
    }

    pub async fn volume_down(&self) {
        let mut model = self.model.lock().await;
        let target = model.machine.volume() - VOLUME_STEP;
        let applied = model.machine.set_volume(target);
        self.renderer.set_volume(applied);
        model.publish();
    }

    pub async fn toggle_mute(&self) {
        let mut model = self.model.lock().await;
        let applied = model.machine.toggle_mute();
        self.renderer.set_volume(applied);
        model.publish();
    }

    // ------------------------------------------------------------------
    // Queue navigation
    // ------------------------------------------------------------------

    /// Advance to the next track in queue order; no-op at the tail or when
    /// the selection is not in the queue.
    pub async fn next_track(&self, autoplay: bool) {
        let target = {
            let model = self.model.lock().await;
            let Some(current) = model.machine.track() else {
                return;
            };
            queue::next_index(&model.queue, current.id).map(|i| model.queue[i].clone())
        };

        if let Some(track) = target {
            self.select_track(track, autoplay).await;
        } else {
            tracing::debug!("next at end of queue, ignoring");
        }
    }

    /// Go back one track when early in the current one, restart it
    /// otherwise.
    pub async fn previous_track(&self) {
        let (action, was_playing) = {
            let model = self.model.lock().await;
            let Some(current) = model.machine.track() else {
                return;
            };
            (
                queue::previous_action(&model.queue, current.id, model.machine.position()),
                model.machine.state() == PlaybackState::Playing,
            )
        };

        match action {
            PreviousAction::JumpTo(index) => {
                let track = {
                    let model = self.model.lock().await;
                    model.queue.get(index).cloned()
                };
                if let Some(track) = track {
                    self.select_track(track, was_playing).await;
                }
            }
            PreviousAction::Restart => self.restart_current(was_playing).await,
            PreviousAction::Nothing => {}
        }
    }

    /// Seek the current track back to 0 when a seek is legal; after Ended or
    /// Failed the binding is gone, so reload the track instead.
    async fn restart_current(&self, autoplay: bool) {
        let reload = {
            let mut model = self.model.lock().await;
            if model.machine.seek(0.0).is_some() {
                self.renderer.seek(Duration::ZERO);
                model.publish();
                None
            } else {
                model.machine.track().cloned()
            }
        };

        if let Some(track) = reload {
            self.select_track(track, autoplay).await;
        }
    }

    // ------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------

    /// Re-fetch the catalog. Deletion of the currently playing track by an
    /// external actor is treated as an interrupt: stop, release, Idle.
    pub async fn refresh_catalog(&self) {
        let songs = match self.library.list_songs(&self.credential).await {
            Ok(songs) => songs,
            Err(e) => {
                let mut model = self.model.lock().await;
                model.set_error(Self::format_error(&e));
                if matches!(e, StreamError::Auth) {
                    model.notify_session_expired();
                }
                return;
            }
        };

        let interrupted = {
            let mut model = self.model.lock().await;
            model.queue = songs;
            model.clamp_selection();
            let gone = model
                .machine
                .track()
                .is_some_and(|t| !model.queue.iter().any(|q| q.id == t.id));
            if gone {
                let title = model
                    .machine
                    .track()
                    .map(|t| t.title.clone())
                    .unwrap_or_default();
                model.machine.interrupt();
                model.set_error(format!("'{title}' was removed from the library"));
                model.publish();
            }
            gone
        };

        if interrupted {
            self.release_current().await;
        }
    }
}
