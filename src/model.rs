//! Model module - Application state and data types
//!
//! This module contains the data structures and state management for the
//! client. It is organized into submodules by responsibility:
//!
//! - `track`: Catalog track record
//! - `errors`: Stream and render error taxonomy
//! - `playback`: Playback state machine and transport parameters
//! - `queue`: Queue navigation policy
//! - `stream_loader`: Authenticated per-track byte fetching
//! - `library_client`: Catalog listing client
//! - `app_model`: Main application model with state management methods

mod app_model;
mod errors;
mod library_client;
mod playback;
pub mod queue;
mod stream_loader;
mod track;

pub use app_model::{AppModel, UiState};
pub use errors::{RenderError, StreamError};
pub use library_client::LibraryClient;
pub use playback::{DEFAULT_VOLUME, PlaybackInfo, PlaybackMachine, PlaybackState};
pub use stream_loader::{ResourceHandle, StreamLoader};
pub use track::Track;
