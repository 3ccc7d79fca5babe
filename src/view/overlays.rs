//! Overlay rendering (error notification, help popup, now playing)

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::model::{PlaybackInfo, PlayerStatus, UiState};
use super::utils::format_duration;

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    }
}

pub fn render_error_notification(frame: &mut Frame, ui_state: &UiState) {
    if let Some(ref error_msg) = ui_state.error_message {
        let area = frame.area();

        let popup_width = 52.min(area.width.saturating_sub(4));
        let inner_width = popup_width.saturating_sub(4).max(1) as usize;

        let error_line_count = error_msg.chars().count().div_ceil(inner_width) as u16;
        let popup_height = 2 + error_line_count.max(1);

        let popup_area = centered(area, popup_width, popup_height);
        frame.render_widget(Clear, popup_area);

        let error_widget = Paragraph::new(error_msg.to_string())
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red))
                    .title(" Error (Esc to dismiss) ")
                    .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
                    .style(Style::default().bg(Color::Black)),
            );

        frame.render_widget(error_widget, popup_area);
    }
}

pub fn render_now_playing(frame: &mut Frame, playback: &PlaybackInfo) {
    let area = frame.area();
    let popup_area = centered(area, 64, 12);
    frame.render_widget(Clear, popup_area);

    let label = |name: &str| Span::styled(format!("{:>10}  ", name), Style::default().fg(Color::DarkGray));

    let lines: Vec<Line> = match &playback.current_song {
        None => vec![Line::from(Span::styled(
            "No song playing",
            Style::default().fg(Color::DarkGray),
        ))],
        Some(song) => {
            let state = match playback.status {
                PlayerStatus::Playing => "⏸ Space to pause",
                PlayerStatus::Paused => "▶ Space to resume",
                PlayerStatus::Loading => "… Loading",
                PlayerStatus::Idle => "■ Stopped",
            };
            let position = match playback.current_index {
                Some(index) => format!("{} of {}", index + 1, playback.queue_len),
                None => "not queued".to_string(),
            };
            vec![
                Line::from(Span::styled(
                    song.name.clone(),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(song.artists.clone(), Style::default().fg(Color::Gray))),
                Line::from(""),
                Line::from(vec![label("Album"), Span::raw(song.album.clone().unwrap_or_default())]),
                Line::from(vec![label("Language"), Span::raw(song.language.clone().unwrap_or_default())]),
                Line::from(vec![
                    label("Time"),
                    Span::raw(format!(
                        "{} / {}",
                        format_duration(playback.progress_ms),
                        format_duration(playback.duration_ms)
                    )),
                ]),
                Line::from(vec![label("Queue"), Span::raw(position)]),
                Line::from(vec![label("Artwork"), Span::raw(song.thumbnail_url().unwrap_or("-").to_string())]),
                Line::from(Span::styled(state, Style::default().fg(Color::Green))),
            ]
        }
    };

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Now Playing (V or Esc to close) ")
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(Color::Black)),
        );

    frame.render_widget(widget, popup_area);
}

pub fn render_help_popup(frame: &mut Frame) {
    let area = frame.area();

    let keybindings = [
        ("", "── Navigation ──"),
        ("Tab / /", "Focus search"),
        ("↑ / ↓", "Move selection"),
        ("Esc", "Back to catalog"),
        ("", ""),
        ("", "── Playback ──"),
        ("Enter", "Play selected"),
        ("A", "Add to queue and play"),
        ("Space", "Play / Pause"),
        ("N", "Next song"),
        ("V", "Now playing"),
        ("", ""),
        ("", "── General ──"),
        ("H", "Toggle this help"),
        ("Q", "Quit"),
    ];

    let popup_height = keybindings.len() as u16 + 2;
    let popup_area = centered(area, 50, popup_height);
    frame.render_widget(Clear, popup_area);

    let lines: Vec<Line> = keybindings
        .iter()
        .map(|(key, desc)| {
            if key.is_empty() {
                Line::from(Span::styled(
                    format!("{:^46}", desc),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(vec![
                    Span::styled(
                        format!("{:>14}", key),
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(desc.to_string(), Style::default().fg(Color::White)),
                ])
            }
        })
        .collect();

    let help_text = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help (H or Esc to close) ")
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(Color::Black)),
        )
        .style(Style::default().bg(Color::Black));

    frame.render_widget(help_text, popup_area);
}
