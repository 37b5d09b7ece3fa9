//! Renderer progress ticker
//!
//! rodio has no event channel; the audio thread publishes position and
//! end-of-media into a status cell, and this task folds them into the state
//! machine. These reports are the only path into the tick/Ended transitions.

use std::time::Duration;

use crate::model::PlaybackState;
use super::AppController;

const TICK_INTERVAL: Duration = Duration::from_millis(200);

impl AppController {
    pub fn start_renderer_event_listener(&self) {
        let controller = self.clone();
        tracing::info!("starting renderer progress ticker");

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            loop {
                interval.tick().await;

                let status = controller.renderer.status();
                let ended = {
                    let mut model = controller.model.lock().await;
                    if model.ui.should_quit {
                        tracing::debug!("renderer ticker shutting down");
                        break;
                    }
                    // Between unbind and the next bind the cell is reset and
                    // carries nothing to report.
                    if !status.bound || model.machine.state() != PlaybackState::Playing {
                        continue;
                    }
                    if status.finished {
                        model.machine.ended();
                        model.publish();
                        true
                    } else {
                        model.machine.tick(status.position_secs);
                        model.publish();
                        false
                    }
                };

                if ended {
                    // End-of-media advances the queue; at the tail this is a
                    // no-op and the machine rests at Ended.
                    controller.next_track(true).await;
                }
            }
        });
    }
}
