//! Player bar rendering

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::{PlaybackInfo, PlayerStatus};
use super::utils::format_duration;

pub fn render_player_bar(frame: &mut Frame, area: Rect, playback: &PlaybackInfo) {
    let glyph = match playback.status {
        PlayerStatus::Playing => "▶",
        PlayerStatus::Paused => "⏸",
        PlayerStatus::Loading => "…",
        PlayerStatus::Idle => "■",
    };

    let status_text = match &playback.current_song {
        Some(song) => format!(" {} {} | {}", glyph, song.name, song.artists),
        None if playback.status == PlayerStatus::Loading => " … Loading".to_string(),
        None => " Select a song".to_string(),
    };

    let queue_text = match playback.current_index {
        Some(index) => format!(" Queue {}/{} ", index + 1, playback.queue_len),
        None => format!(" Queue {} ", playback.queue_len),
    };

    let time_str = format!(
        "{} / {}",
        format_duration(playback.progress_ms),
        format_duration(playback.duration_ms)
    );

    let progress_ratio = if playback.duration_ms > 0 {
        (playback.progress_ms as f64 / playback.duration_ms as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} ", status_text))
                .title_bottom(Line::from(" Space play/pause | n next | h help ").left_aligned())
                .title_bottom(Line::from(queue_text).right_aligned()),
        )
        .gauge_style(Style::default().fg(if playback.is_playing() { Color::Green } else { Color::Yellow }))
        .ratio(progress_ratio)
        .label(time_str);

    frame.render_widget(gauge, area);
}
