//! Renderer command and status types

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::oneshot;

use crate::model::RenderError;

/// Commands accepted by the audio thread.
pub enum RendererCmd {
    /// Decode `audio` and prepare a paused sink for it, replacing any current
    /// binding. Replies with the decoder-reported duration in seconds, when
    /// the format carries one.
    Bind {
        audio: Bytes,
        reply: oneshot::Sender<Result<Option<f64>, RenderError>>,
    },
    /// Start or resume playback. Replies so a platform refusal can be rolled
    /// back by the caller.
    Play {
        reply: oneshot::Sender<Result<(), RenderError>>,
    },
    Pause,
    Seek(Duration),
    SetVolume(f32),
    /// Stop and drop the current binding.
    Unbind,
    Quit,
}

/// Status the audio thread publishes for the progress ticker.
#[derive(Clone, Debug, Default)]
pub struct RendererStatus {
    pub position_secs: f64,
    /// The bound source has been fully played out.
    pub finished: bool,
    pub bound: bool,
}

pub type StatusHandle = Arc<Mutex<RendererStatus>>;
