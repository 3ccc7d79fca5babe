//! Top bar: search input and current listing mode

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};

use crate::audio::DEVICE_NAME;
use crate::model::{ActiveSection, CatalogView, UiState};

pub fn render_top_bar(frame: &mut Frame, area: Rect, ui_state: &UiState, catalog: &CatalogView) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Search input
            Constraint::Length(30), // Mode
        ])
        .split(area);

    let focused = ui_state.active_section == ActiveSection::Search;
    let search_style = if focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::White)
    };

    let search_text = if ui_state.search_input.is_empty() {
        if focused { "Type a song, artist or album and press Enter" } else { "Press / to search..." }
    } else {
        ui_state.search_input.as_str()
    };

    // Back hint mirrors the listing being filtered
    let title = if catalog.is_searching || !ui_state.search_input.is_empty() {
        " ⟵ Esc | Search "
    } else {
        " Search "
    };

    let search = Paragraph::new(search_text)
        .style(search_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .padding(Padding::horizontal(1))
                .border_style(if focused {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                }),
        );
    frame.render_widget(search, chunks[0]);

    let mode = Paragraph::new(format!("🎵 {}", catalog.mode_label))
        .style(Style::default().fg(Color::Cyan))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", DEVICE_NAME)),
        );
    frame.render_widget(mode, chunks[1]);
}
