//! View module - UI rendering
//!
//! - `utils`: formatting helpers and scrollable lists
//! - `layout`: header and search bar
//! - `content`: the song list
//! - `progress`: the player bar
//! - `overlays`: error notification, help and now-playing popups

mod utils;
mod layout;
mod content;
mod progress;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{CatalogView, PlaybackInfo, UiState};

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, playback: &PlaybackInfo, ui_state: &UiState, catalog: &CatalogView) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar
                Constraint::Min(0),    // Song list
                Constraint::Length(3), // Player bar
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], ui_state, catalog);

        let current_id = playback.current_song.as_ref().map(|song| song.id.as_str());
        content::render_song_list(frame, chunks[1], ui_state, catalog, current_id);

        progress::render_player_bar(frame, chunks[2], playback);

        if ui_state.show_now_playing {
            overlays::render_now_playing(frame, playback);
        }

        if ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }

        if ui_state.error_message.is_some() {
            overlays::render_error_notification(frame, ui_state);
        }
    }
}
