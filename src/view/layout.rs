//! Layout rendering (header, catalog table)

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Padding, Paragraph, Row, Table, TableState},
};

use crate::model::{PlaybackInfo, Track, UiState};
use super::utils::{format_size, truncate_string};

pub fn render_header(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Server + user
            Constraint::Length(52), // Key hints
        ])
        .split(area);

    let session = Paragraph::new(format!("{} @ {}", ui_state.username, ui_state.server_name))
        .style(Style::default().fg(Color::Cyan))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Waves ")
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(session, chunks[0]);

    let hints = Paragraph::new("Enter play | Space pause | n/p skip | m mute | q quit")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title(" Keys "));
    frame.render_widget(hints, chunks[1]);
}

pub fn render_song_table(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    queue: &[Track],
    playback: &PlaybackInfo,
) {
    let playing_id = playback.track.as_ref().map(|t| t.id);

    let header = Row::new(vec!["", "Title", "Artist", "Album", "Genre", "Size"])
        .style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = queue
        .iter()
        .map(|track| {
            let marker = if playing_id == Some(track.id) { "♪" } else { " " };
            let style = if playing_id == Some(track.id) {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::White)
            };
            Row::new(vec![
                Cell::from(marker),
                Cell::from(truncate_string(&track.title, 40)),
                Cell::from(truncate_string(&track.artist, 28)),
                Cell::from(truncate_string(track.album_str(), 24)),
                Cell::from(track.genre_str().to_string()),
                Cell::from(format_size(track.file_size)),
            ])
            .style(style)
        })
        .collect();

    let title = format!(" Library ({} songs) ", queue.len());
    let table = Table::new(
        rows,
        [
            Constraint::Length(1),
            Constraint::Percentage(35),
            Constraint::Percentage(25),
            Constraint::Percentage(20),
            Constraint::Length(12),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(title))
    .row_highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    );

    let mut state = TableState::default();
    if !queue.is_empty() {
        state.select(Some(ui_state.selected.min(queue.len() - 1)));
    }

    frame.render_stateful_widget(table, area, &mut state);
}
