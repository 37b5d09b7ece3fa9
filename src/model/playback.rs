//! Playback state machine and transport parameters
//!
//! All "now playing" state lives in one tagged union plus a transport record,
//! and changes only through the methods here. The controller translates the
//! return values into renderer commands; the renderer's progress callbacks are
//! the only way into Ready, Ended and Failed.

use super::track::Track;

/// The perceived-loudness ceiling. The renderer's native range goes to 1.0;
/// the client never drives it above this.
pub const MAX_VOLUME: f32 = 0.6;

/// Volume restored when unmuting from a remembered volume of 0.
pub const UNMUTE_FALLBACK_VOLUME: f32 = 0.3;

pub const DEFAULT_VOLUME: f32 = 0.3;

/// Transport state of the controller. Exactly one is active at a time and it
/// is the single source of truth for which transport operations are legal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Ended,
    Failed,
}

/// Transport parameters for the current track.
#[derive(Clone, Debug)]
struct Transport {
    /// Play position in seconds, 0 <= position <= duration.
    position: f64,
    /// Renderer-reported duration in seconds. Only trustworthy in
    /// Ready/Playing/Paused; `None` until the renderer delivers metadata.
    duration: Option<f64>,
    volume: f32,
    muted: bool,
    /// Volume remembered at mute time, restored on unmute.
    restore_volume: f32,
}

impl Default for Transport {
    fn default() -> Self {
        Self {
            position: 0.0,
            duration: None,
            volume: DEFAULT_VOLUME,
            muted: false,
            restore_volume: DEFAULT_VOLUME,
        }
    }
}

/// Snapshot pushed to observers on every state or transport change.
#[derive(Clone, Debug)]
pub struct PlaybackInfo {
    pub state: PlaybackState,
    pub track: Option<Track>,
    pub position: f64,
    pub duration: Option<f64>,
    pub volume: f32,
    pub muted: bool,
}

impl Default for PlaybackInfo {
    fn default() -> Self {
        Self {
            state: PlaybackState::Idle,
            track: None,
            position: 0.0,
            duration: None,
            volume: DEFAULT_VOLUME,
            muted: false,
        }
    }
}

/// The playback state machine. Owns the `PlaybackState` and transport record;
/// volume and mute survive track changes, position and duration do not.
pub struct PlaybackMachine {
    state: PlaybackState,
    transport: Transport,
    track: Option<Track>,
}

impl PlaybackMachine {
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Idle,
            transport: Transport::default(),
            track: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn track(&self) -> Option<&Track> {
        self.track.as_ref()
    }

    pub fn position(&self) -> f64 {
        self.transport.position
    }

    pub fn volume(&self) -> f32 {
        self.transport.volume
    }

    pub fn snapshot(&self) -> PlaybackInfo {
        PlaybackInfo {
            state: self.state,
            track: self.track.clone(),
            position: self.transport.position,
            duration: self.transport.duration,
            volume: self.transport.volume,
            muted: self.transport.muted,
        }
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// A new selection was made. Legal from every state; discards the old
    /// track's transport parameters while keeping volume and mute.
    pub fn begin_loading(&mut self, track: Track) {
        tracing::debug!(track_id = track.id, title = %track.title, "state -> Loading");
        self.track = Some(track);
        self.state = PlaybackState::Loading;
        self.transport.position = 0.0;
        self.transport.duration = None;
    }

    /// External interrupt (current track deleted, teardown): drop the
    /// selection entirely and return to Idle.
    pub fn interrupt(&mut self) {
        tracing::debug!("state -> Idle (interrupted)");
        self.track = None;
        self.state = PlaybackState::Idle;
        self.transport.position = 0.0;
        self.transport.duration = None;
    }

    // ------------------------------------------------------------------
    // Renderer callbacks (the only way into Ready / Ended / Failed)
    // ------------------------------------------------------------------

    /// Handle bound and renderer metadata available: Loading -> Ready.
    pub fn loaded(&mut self, duration: Option<f64>) {
        if self.state != PlaybackState::Loading {
            tracing::warn!(state = ?self.state, "loaded() outside Loading, ignoring");
            return;
        }
        self.transport.duration = duration;
        self.state = PlaybackState::Ready;
        tracing::debug!(?duration, "state -> Ready");
    }

    /// Acquire or bind failed: Loading -> Failed.
    pub fn load_failed(&mut self) {
        if self.state != PlaybackState::Loading {
            tracing::warn!(state = ?self.state, "load_failed() outside Loading, ignoring");
            return;
        }
        self.state = PlaybackState::Failed;
        tracing::debug!("state -> Failed (load)");
    }

    /// Periodic position report while the renderer runs.
    pub fn tick(&mut self, position_secs: f64) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.transport.position = match self.transport.duration {
            Some(d) => position_secs.min(d),
            None => position_secs,
        };
    }

    /// Renderer reached end-of-media: Playing -> Ended.
    pub fn ended(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        if let Some(d) = self.transport.duration {
            self.transport.position = d;
        }
        self.state = PlaybackState::Ended;
        tracing::debug!("state -> Ended");
    }

    // ------------------------------------------------------------------
    // Transport operations
    // ------------------------------------------------------------------

    /// Whether a play request is legal right now. The caller starts the
    /// renderer first and only then calls [`confirm_play`]; a platform
    /// rejection therefore leaves the state at its pre-call value.
    ///
    /// [`confirm_play`]: PlaybackMachine::confirm_play
    pub fn can_play(&self) -> bool {
        matches!(self.state, PlaybackState::Ready | PlaybackState::Paused)
    }

    pub fn confirm_play(&mut self) {
        debug_assert!(self.can_play());
        self.state = PlaybackState::Playing;
        tracing::debug!("state -> Playing");
    }

    pub fn can_pause(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn confirm_pause(&mut self) {
        debug_assert!(self.can_pause());
        self.state = PlaybackState::Paused;
        tracing::debug!("state -> Paused");
    }

    /// Clamp a seek target into [0, duration] and apply it. Returns the
    /// clamped target for the renderer, or `None` when seeking is not legal
    /// (wrong state, or no duration known yet).
    pub fn seek(&mut self, target_secs: f64) -> Option<f64> {
        if !matches!(
            self.state,
            PlaybackState::Ready | PlaybackState::Playing | PlaybackState::Paused
        ) {
            return None;
        }
        let duration = self.transport.duration?;
        let clamped = target_secs.clamp(0.0, duration);
        self.transport.position = clamped;
        Some(clamped)
    }

    /// Clamp `v` into [0, MAX_VOLUME] and apply the mute coupling: zero
    /// implies muted, raising the volume clears a mute. Returns the volume
    /// the renderer should be driven at.
    pub fn set_volume(&mut self, v: f32) -> f32 {
        let v = v.clamp(0.0, MAX_VOLUME);
        self.transport.volume = v;
        if v == 0.0 {
            self.transport.muted = true;
        } else if self.transport.muted {
            self.transport.muted = false;
        }
        v
    }

    /// Mute remembers the current volume and drives the renderer to zero;
    /// unmute restores the remembered volume, or a nonzero default when the
    /// remembered volume was itself zero. Returns the renderer volume.
    pub fn toggle_mute(&mut self) -> f32 {
        if self.transport.muted {
            let restored = if self.transport.restore_volume == 0.0 {
                UNMUTE_FALLBACK_VOLUME
            } else {
                self.transport.restore_volume
            };
            self.transport.volume = restored;
            self.transport.muted = false;
            restored
        } else {
            self.transport.restore_volume = self.transport.volume;
            self.transport.volume = 0.0;
            self.transport.muted = true;
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: u64) -> Track {
        Track {
            id,
            title: "t".into(),
            artist: "a".into(),
            album: None,
            genre: None,
            file_size: 0,
            bitrate: None,
            format: None,
            upload_date: None,
        }
    }

    fn ready_machine(duration: f64) -> PlaybackMachine {
        let mut m = PlaybackMachine::new();
        m.begin_loading(track(1));
        m.loaded(Some(duration));
        m
    }

    #[test]
    fn idle_to_playing_happy_path() {
        let mut m = PlaybackMachine::new();
        assert_eq!(m.state(), PlaybackState::Idle);
        assert!(!m.can_play());

        m.begin_loading(track(1));
        assert_eq!(m.state(), PlaybackState::Loading);
        assert!(!m.can_play());

        m.loaded(Some(180.0));
        assert_eq!(m.state(), PlaybackState::Ready);
        assert!(m.can_play());

        m.confirm_play();
        assert_eq!(m.state(), PlaybackState::Playing);
    }

    #[test]
    fn pause_only_legal_while_playing() {
        let mut m = ready_machine(100.0);
        assert!(!m.can_pause());
        m.confirm_play();
        assert!(m.can_pause());
        m.confirm_pause();
        assert_eq!(m.state(), PlaybackState::Paused);
        assert!(m.can_play());
    }

    #[test]
    fn load_failure_goes_to_failed_and_reselection_recovers() {
        let mut m = PlaybackMachine::new();
        m.begin_loading(track(1));
        m.load_failed();
        assert_eq!(m.state(), PlaybackState::Failed);

        m.begin_loading(track(2));
        assert_eq!(m.state(), PlaybackState::Loading);
    }

    #[test]
    fn end_of_media_from_playing() {
        let mut m = ready_machine(90.0);
        m.confirm_play();
        m.ended();
        assert_eq!(m.state(), PlaybackState::Ended);
        assert_eq!(m.snapshot().position, 90.0);

        // already Ended; a second report is ignored
        m.ended();
        assert_eq!(m.state(), PlaybackState::Ended);
    }

    #[test]
    fn skip_during_playback_discards_old_transport() {
        let mut m = ready_machine(200.0);
        m.confirm_play();
        m.tick(42.0);
        assert_eq!(m.snapshot().position, 42.0);

        m.begin_loading(track(2));
        let snap = m.snapshot();
        assert_eq!(snap.state, PlaybackState::Loading);
        assert_eq!(snap.position, 0.0);
        assert_eq!(snap.duration, None);
    }

    #[test]
    fn seek_clamps_into_duration() {
        let mut m = ready_machine(200.0);
        assert_eq!(m.seek(9999.0), Some(200.0));
        assert_eq!(m.snapshot().position, 200.0);
        assert_eq!(m.seek(-3.0), Some(0.0));
    }

    #[test]
    fn seek_illegal_without_duration() {
        let mut m = PlaybackMachine::new();
        m.begin_loading(track(1));
        assert_eq!(m.seek(10.0), None);

        m.loaded(None); // metadata arrived without a duration
        assert_eq!(m.seek(10.0), None);
    }

    #[test]
    fn volume_clamped_to_ceiling() {
        let mut m = PlaybackMachine::new();
        assert_eq!(m.set_volume(1.0), MAX_VOLUME);
        assert_eq!(m.set_volume(-0.5), 0.0);
    }

    #[test]
    fn zero_volume_implies_muted_and_raising_unmutes() {
        let mut m = PlaybackMachine::new();
        m.set_volume(0.0);
        assert!(m.snapshot().muted);

        m.set_volume(0.4);
        assert!(!m.snapshot().muted);
        assert_eq!(m.snapshot().volume, 0.4);
    }

    #[test]
    fn toggle_mute_twice_restores_premute_volume() {
        let mut m = PlaybackMachine::new();
        m.set_volume(0.45);

        assert_eq!(m.toggle_mute(), 0.0);
        assert!(m.snapshot().muted);
        assert_eq!(m.snapshot().volume, 0.0);

        assert_eq!(m.toggle_mute(), 0.45);
        assert!(!m.snapshot().muted);
        assert_eq!(m.snapshot().volume, 0.45);
    }

    #[test]
    fn unmute_fallback_when_remembered_volume_was_zero() {
        let mut m = PlaybackMachine::new();
        // Muting at volume 0 remembers 0; unmuting must not restore silence.
        m.transport.volume = 0.0;
        m.toggle_mute();
        assert!(m.snapshot().muted);

        assert_eq!(m.toggle_mute(), UNMUTE_FALLBACK_VOLUME);
        assert_eq!(m.snapshot().volume, UNMUTE_FALLBACK_VOLUME);
        assert!(!m.snapshot().muted);
    }

    #[test]
    fn tick_ignored_outside_playing_and_clamped() {
        let mut m = ready_machine(100.0);
        m.tick(50.0);
        assert_eq!(m.snapshot().position, 0.0);

        m.confirm_play();
        m.tick(150.0);
        assert_eq!(m.snapshot().position, 100.0);
    }

    #[test]
    fn interrupt_drops_selection() {
        let mut m = ready_machine(100.0);
        m.confirm_play();
        m.interrupt();
        let snap = m.snapshot();
        assert_eq!(snap.state, PlaybackState::Idle);
        assert!(snap.track.is_none());
        assert_eq!(snap.position, 0.0);
        assert_eq!(snap.duration, None);
    }
}
