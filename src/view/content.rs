//! Song list rendering

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, ListItem, Padding, Paragraph},
    Frame,
};

use crate::model::{ActiveSection, CatalogView, UiState};
use super::utils::{calculate_song_column_widths, format_duration, render_scrollable_list, truncate_string};

pub fn render_song_list(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    catalog: &CatalogView,
    current_id: Option<&str>,
) {
    let is_focused = ui_state.active_section == ActiveSection::Songs;
    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    let title = if catalog.is_loading {
        format!(" {} (loading...) ", catalog.mode_label)
    } else {
        format!(" {} ({}) ", catalog.mode_label, catalog.songs.len())
    };

    if catalog.songs.is_empty() {
        let message = if catalog.is_loading {
            "Loading..."
        } else if catalog.is_searching {
            "No songs found. Press Esc to go back."
        } else {
            "No songs yet. Press / to search."
        };
        let placeholder = Paragraph::new(message)
            .style(Style::default().fg(if catalog.is_loading { Color::Yellow } else { Color::DarkGray }))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .padding(Padding::horizontal(1))
                    .border_style(border_style),
            );
        frame.render_widget(placeholder, area);
        return;
    }

    let content_width = area.width.saturating_sub(4) as usize;
    let (num_width, title_width, artist_width, duration_width) =
        calculate_song_column_widths(content_width, catalog.songs.len());

    let items: Vec<ListItem> = catalog
        .songs
        .iter()
        .enumerate()
        .map(|(i, song)| {
            let is_selected = i == ui_state.selected;
            let is_current = current_id == Some(song.id.as_str());

            let marker = if is_current { "▶" } else { " " };
            let duration = song
                .duration_secs
                .map(|secs| format_duration(secs.saturating_mul(1000)))
                .unwrap_or_default();
            let line = format!(
                "{}{:>num_width$}   {}   {}   {:>duration_width$}",
                marker,
                i + 1,
                truncate_string(&song.name, title_width),
                truncate_string(&song.artists, artist_width),
                duration,
                num_width = num_width,
                duration_width = duration_width,
            );

            let style = if is_selected && is_focused {
                Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD)
            } else if is_selected {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else if is_current {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding::horizontal(1))
        .border_style(border_style);

    render_scrollable_list(frame, area, items, ui_state.selected, block);
}
