//! Queue navigation policy
//!
//! The catalog order is the playback order. These helpers only compute the
//! target of a next/previous request; the controller performs the actual
//! release/acquire and state transitions.

use super::track::Track;

/// Below this play position, `previous` jumps to the prior track; at or above
/// it, `previous` restarts the current one.
pub const PREVIOUS_RESTART_THRESHOLD_SECS: f64 = 5.0;

/// Outcome of a `previous` request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreviousAction {
    /// Change selection to the track at this queue index.
    JumpTo(usize),
    /// Keep the selection, seek the current track back to 0.
    Restart,
    /// Queue empty or selection not in the queue; do nothing.
    Nothing,
}

/// Index of the track after `current_id`, or `None` at the tail (no wrap) or
/// when the selection is not in the queue. The queue and the selection can
/// disagree briefly during a catalog refresh, so a missing id is not an error.
pub fn next_index(queue: &[Track], current_id: u64) -> Option<usize> {
    let pos = queue.iter().position(|t| t.id == current_id)?;
    if pos + 1 < queue.len() { Some(pos + 1) } else { None }
}

/// Resolve a `previous` request against the restart threshold.
pub fn previous_action(queue: &[Track], current_id: u64, position_secs: f64) -> PreviousAction {
    let Some(pos) = queue.iter().position(|t| t.id == current_id) else {
        return PreviousAction::Nothing;
    };

    if position_secs >= PREVIOUS_RESTART_THRESHOLD_SECS {
        return PreviousAction::Restart;
    }
    if pos == 0 {
        // Nothing before the first track.
        return PreviousAction::Nothing;
    }
    PreviousAction::JumpTo(pos - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::track::Track;

    fn track(id: u64) -> Track {
        Track {
            id,
            title: format!("track-{id}"),
            artist: "artist".into(),
            album: None,
            genre: None,
            file_size: 1_000_000,
            bitrate: Some(192),
            format: Some("mp3".into()),
            upload_date: None,
        }
    }

    fn queue() -> Vec<Track> {
        vec![track(10), track(20), track(30)]
    }

    #[test]
    fn next_advances_in_queue_order() {
        assert_eq!(next_index(&queue(), 10), Some(1));
        assert_eq!(next_index(&queue(), 20), Some(2));
    }

    #[test]
    fn next_at_tail_is_noop() {
        assert_eq!(next_index(&queue(), 30), None);
    }

    #[test]
    fn next_with_unknown_selection_is_noop() {
        assert_eq!(next_index(&queue(), 99), None);
        assert_eq!(next_index(&[], 10), None);
    }

    #[test]
    fn previous_early_in_track_jumps_back() {
        // queue = [A, B, C], current = B, position 2s -> selection becomes A
        assert_eq!(previous_action(&queue(), 20, 2.0), PreviousAction::JumpTo(0));
    }

    #[test]
    fn previous_late_in_track_restarts() {
        // queue = [A, B, C], current = B, position 30s -> restart B
        assert_eq!(previous_action(&queue(), 20, 30.0), PreviousAction::Restart);
    }

    #[test]
    fn previous_at_head_restarts_when_late() {
        assert_eq!(previous_action(&queue(), 10, 12.0), PreviousAction::Restart);
    }

    #[test]
    fn previous_at_head_early_is_noop() {
        assert_eq!(previous_action(&queue(), 10, 1.0), PreviousAction::Nothing);
    }

    #[test]
    fn previous_with_unknown_selection_is_noop() {
        assert_eq!(previous_action(&queue(), 99, 30.0), PreviousAction::Nothing);
        assert_eq!(previous_action(&[], 10, 0.0), PreviousAction::Nothing);
    }
}
