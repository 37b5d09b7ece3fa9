//! Error taxonomy for the streaming and rendering boundaries

use thiserror::Error;

/// Errors produced while acquiring a track's audio bytes from the server.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Credential rejected (HTTP 401). Fatal to the session, never retried
    /// here; the session boundary decides what happens next.
    #[error("credential rejected by server")]
    Auth,

    /// The track no longer exists server-side (HTTP 404).
    #[error("track {0} is unavailable on the server")]
    NotFound(u64),

    /// Transport-level failure or unexpected status. Transient; the user may
    /// retry by reselecting the track.
    #[error("network error: {0}")]
    Network(String),

    /// The fetch completed after a newer selection superseded it. The result
    /// carries no handle and must be discarded by the caller.
    #[error("fetch superseded by a newer selection")]
    Superseded,
}

/// Errors from the audio renderer (decode or output device failure).
#[derive(Clone, Debug, Error)]
pub enum RenderError {
    #[error("no audio output device available: {0}")]
    Output(String),

    #[error("could not decode audio data: {0}")]
    Decode(String),

    #[error("renderer is not bound to any track")]
    Unbound,
}
