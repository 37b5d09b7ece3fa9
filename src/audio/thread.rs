//! The audio thread
//!
//! cpal output streams are not `Send`, so one dedicated thread owns the
//! `OutputStream` and the current `Sink` for its whole life. The async side
//! talks to it over an mpsc channel and reads position/finished through the
//! shared status cell, which this thread refreshes between commands.

use std::io::Cursor;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::model::RenderError;
use super::types::{RendererCmd, RendererStatus, StatusHandle};

const STATUS_REFRESH: Duration = Duration::from_millis(200);

pub(super) fn spawn_audio_thread(
    rx: Receiver<RendererCmd>,
    status: StatusHandle,
    initial_volume: f32,
) -> JoinHandle<()> {
    thread::Builder::new()
        .name("audio-renderer".into())
        .spawn(move || {
            // rodio logs to stderr when the stream drops; that would scribble
            // over the TUI.
            let stream = OutputStreamBuilder::open_default_stream()
                .map(|mut s| {
                    s.log_on_drop(false);
                    s
                })
                .map_err(|e| {
                    tracing::error!(error = %e, "no audio output device");
                    RenderError::Output(e.to_string())
                });

            let mut sink: Option<Sink> = None;
            let mut volume = initial_volume;

            loop {
                match rx.recv_timeout(STATUS_REFRESH) {
                    Ok(cmd) => {
                        if handle_cmd(cmd, &stream, &mut sink, &mut volume, &status) {
                            break;
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }
                refresh_status(&sink, &status);
            }

            if let Some(s) = sink.take() {
                s.stop();
            }
            tracing::debug!("audio thread shut down");
        })
        .expect("failed to spawn audio thread")
}

/// Returns true when the thread should exit.
fn handle_cmd(
    cmd: RendererCmd,
    stream: &Result<OutputStream, RenderError>,
    sink: &mut Option<Sink>,
    volume: &mut f32,
    status: &StatusHandle,
) -> bool {
    match cmd {
        RendererCmd::Bind { audio, reply } => {
            let result = bind(audio, stream, sink, *volume);
            if result.is_ok() {
                let mut st = status.lock().unwrap();
                *st = RendererStatus {
                    position_secs: 0.0,
                    finished: false,
                    bound: true,
                };
            }
            let _ = reply.send(result);
        }
        RendererCmd::Play { reply } => {
            let result = match sink.as_ref() {
                Some(s) => {
                    s.play();
                    Ok(())
                }
                None => Err(RenderError::Unbound),
            };
            let _ = reply.send(result);
        }
        RendererCmd::Pause => {
            if let Some(s) = sink.as_ref() {
                s.pause();
            }
        }
        RendererCmd::Seek(pos) => {
            if let Some(s) = sink.as_ref() {
                if let Err(e) = s.try_seek(pos) {
                    tracing::warn!(error = %e, ?pos, "seek rejected by decoder");
                }
            }
        }
        RendererCmd::SetVolume(v) => {
            *volume = v;
            if let Some(s) = sink.as_ref() {
                s.set_volume(v);
            }
        }
        RendererCmd::Unbind => {
            if let Some(s) = sink.take() {
                s.stop();
            }
            *status.lock().unwrap() = RendererStatus::default();
        }
        RendererCmd::Quit => return true,
    }
    false
}

fn bind(
    audio: bytes::Bytes,
    stream: &Result<OutputStream, RenderError>,
    sink: &mut Option<Sink>,
    volume: f32,
) -> Result<Option<f64>, RenderError> {
    let stream = match stream {
        Ok(s) => s,
        Err(e) => return Err(e.clone()),
    };

    // Replace the old binding before decoding the new one; only one sink may
    // exist at a time.
    if let Some(old) = sink.take() {
        old.stop();
    }

    let source =
        Decoder::new(Cursor::new(audio)).map_err(|e| RenderError::Decode(e.to_string()))?;
    let duration = source.total_duration().map(|d| d.as_secs_f64());

    let new_sink = Sink::connect_new(stream.mixer());
    new_sink.set_volume(volume);
    new_sink.append(source);
    new_sink.pause();

    *sink = Some(new_sink);
    tracing::debug!(?duration, "renderer bound to new source");
    Ok(duration)
}

fn refresh_status(sink: &Option<Sink>, status: &StatusHandle) {
    if let Some(s) = sink.as_ref() {
        let mut st = status.lock().unwrap();
        st.position_secs = s.get_pos().as_secs_f64();
        st.finished = s.empty();
        st.bound = true;
    }
}
