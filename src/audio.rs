//! Media-rendering primitive
//!
//! Async-friendly handle over a dedicated rodio audio thread. Binding and
//! play carry replies (the controller needs decode metadata and the
//! play-refusal signal); the rest of the transport commands are
//! fire-and-forget. Position and end-of-media are read from the shared status
//! cell by the progress ticker.

mod thread;
mod types;

pub use types::RendererStatus;

use std::sync::Mutex as StdMutex;
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::oneshot;

use crate::model::RenderError;
use types::{RendererCmd, StatusHandle};

pub struct Renderer {
    tx: Sender<RendererCmd>,
    status: StatusHandle,
    join: StdMutex<Option<JoinHandle<()>>>,
}

impl Renderer {
    pub fn start(initial_volume: f32) -> Self {
        let (tx, rx) = mpsc::channel::<RendererCmd>();
        let status: StatusHandle = StatusHandle::default();
        let join = thread::spawn_audio_thread(rx, status.clone(), initial_volume);
        Self {
            tx,
            status,
            join: StdMutex::new(Some(join)),
        }
    }

    /// Bind a new byte blob to the renderer, replacing any current binding.
    /// Resolves once the source is decoded, with its duration when known.
    pub async fn bind(&self, audio: Bytes) -> Result<Option<f64>, RenderError> {
        let (reply, rx) = oneshot::channel();
        self.send(RendererCmd::Bind { audio, reply })?;
        rx.await.map_err(|_| gone())?
    }

    /// Start or resume playback. An `Err` means the platform refused to
    /// render; the caller keeps its previous state.
    pub async fn play(&self) -> Result<(), RenderError> {
        let (reply, rx) = oneshot::channel();
        self.send(RendererCmd::Play { reply })?;
        rx.await.map_err(|_| gone())?
    }

    pub fn pause(&self) {
        let _ = self.send(RendererCmd::Pause);
    }

    pub fn seek(&self, position: Duration) {
        let _ = self.send(RendererCmd::Seek(position));
    }

    pub fn set_volume(&self, volume: f32) {
        let _ = self.send(RendererCmd::SetVolume(volume));
    }

    /// Stop playback and drop the current binding. After this the released
    /// byte blob is no longer referenced by the audio thread.
    pub fn unbind(&self) {
        let _ = self.send(RendererCmd::Unbind);
    }

    pub fn status(&self) -> RendererStatus {
        self.status.lock().unwrap().clone()
    }

    /// Stop the audio thread and wait for it to exit.
    pub fn shutdown(&self) {
        let _ = self.send(RendererCmd::Quit);
        if let Ok(mut join) = self.join.lock() {
            if let Some(handle) = join.take() {
                let _ = handle.join();
            }
        }
    }

    fn send(&self, cmd: RendererCmd) -> Result<(), RenderError> {
        self.tx.send(cmd).map_err(|_| gone())
    }
}

fn gone() -> RenderError {
    RenderError::Output("audio thread is gone".into())
}
