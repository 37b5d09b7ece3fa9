//! Transport bar rendering

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
};

use crate::model::{PlaybackInfo, PlaybackState};
use super::utils::format_duration;

pub fn render_transport_bar(frame: &mut Frame, area: Rect, playback: &PlaybackInfo) {
    let status_text = match (&playback.track, playback.state) {
        (None, _) => " No track selected".to_string(),
        (Some(t), PlaybackState::Loading) => format!(" … {} | {}", t.title, t.artist),
        (Some(t), PlaybackState::Playing) => format!(" ▶ {} | {}", t.title, t.artist),
        (Some(t), PlaybackState::Paused) => format!(" ⏸ {} | {}", t.title, t.artist),
        (Some(t), PlaybackState::Ended) => format!(" ■ {} | {}", t.title, t.artist),
        (Some(t), PlaybackState::Failed) => format!(" ✗ {} | {}", t.title, t.artist),
        (Some(t), _) => format!(" {} | {}", t.title, t.artist),
    };

    let volume_text = if playback.muted {
        "Vol: muted".to_string()
    } else {
        format!("Vol: {:.0}%", playback.volume * 100.0)
    };

    let time_str = match playback.duration {
        Some(d) => format!("{} / {}", format_duration(playback.position), format_duration(d)),
        None => format_duration(playback.position),
    };

    let progress_ratio = match playback.duration {
        Some(d) if d > 0.0 => (playback.position / d).clamp(0.0, 1.0),
        _ => 0.0,
    };

    let gauge_color = match playback.state {
        PlaybackState::Failed => Color::Red,
        PlaybackState::Loading => Color::Yellow,
        _ => Color::Green,
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} ", status_text))
                .title_bottom(Line::from(format!(" {} ", volume_text)).right_aligned()),
        )
        .gauge_style(Style::default().fg(gauge_color))
        .ratio(progress_ratio)
        .label(time_str);

    frame.render_widget(gauge, area);
}
