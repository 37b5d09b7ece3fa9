//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model and the renderer, and manages playback
//! operations. It is organized into submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `playback`: Selection, transport and queue navigation
//! - `player_events`: Renderer progress ticker

mod input;
mod playback;
mod player_events;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::audio::Renderer;
use crate::auth::Credential;
use crate::model::{AppModel, LibraryClient, ResourceHandle, StreamError, StreamLoader};

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    pub(crate) renderer: Arc<Renderer>,
    pub(crate) loader: Arc<StreamLoader>,
    pub(crate) library: LibraryClient,
    /// The bearer credential from the session boundary, passed explicitly
    /// into every fetch.
    pub(crate) credential: Credential,
    /// The single live resource handle for this controller instance.
    pub(crate) current_handle: Arc<Mutex<Option<ResourceHandle>>>,
}

impl AppController {
    pub fn new(
        model: Arc<Mutex<AppModel>>,
        renderer: Arc<Renderer>,
        loader: Arc<StreamLoader>,
        library: LibraryClient,
        credential: Credential,
    ) -> Self {
        Self {
            model,
            renderer,
            loader,
            library,
            credential,
            current_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Release the renderer binding and the live handle, in that order; the
    /// handle must not outlive its binding.
    pub(crate) async fn release_current(&self) {
        self.renderer.unbind();
        self.current_handle.lock().await.take();
    }

    /// Tear down playback on exit: stop the renderer, release the handle and
    /// park the machine in Idle.
    pub async fn shutdown(&self) {
        self.release_current().await;
        {
            let mut model = self.model.lock().await;
            model.machine.interrupt();
            model.publish();
        }
        self.renderer.shutdown();
        tracing::debug!(live = self.loader.live_handles(), "playback torn down");
    }

    pub(crate) fn format_error(error: &StreamError) -> String {
        match error {
            StreamError::Auth => "Session expired. Please log in again.".to_string(),
            StreamError::NotFound(_) => {
                "Track unavailable on the server. Refresh the library with 'r'.".to_string()
            }
            StreamError::Network(e) => format!("Network error: {e}"),
            StreamError::Superseded => "Superseded request".to_string(),
        }
    }
}
