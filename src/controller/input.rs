//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::ActiveSection;
use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let model = &self.model;

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            model.set_should_quit(true).await;
            return Ok(());
        }

        // An error notification blocks everything else until dismissed
        if model.has_error().await {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                model.clear_error().await;
            }
            return Ok(());
        }

        if model.is_help_popup_open().await {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H')) {
                model.toggle_help_popup().await;
            }
            return Ok(());
        }

        if model.is_now_playing_open().await {
            match key.code {
                KeyCode::Esc | KeyCode::Char('v') | KeyCode::Char('V') => model.toggle_now_playing().await,
                KeyCode::Char(' ') => self.spawn_toggle(),
                KeyCode::Char('n') | KeyCode::Char('N') => self.spawn_next_track(),
                _ => {}
            }
            return Ok(());
        }

        let ui_state = model.get_ui_state().await;

        if ui_state.active_section == ActiveSection::Search {
            match key.code {
                KeyCode::Tab | KeyCode::BackTab | KeyCode::Down => {
                    model.cycle_section().await;
                }
                KeyCode::Enter => {
                    self.spawn_search();
                }
                KeyCode::Esc => {
                    if ui_state.search_input.is_empty() && !model.is_searching().await {
                        model.set_active_section(ActiveSection::Songs).await;
                    } else {
                        self.spawn_go_back();
                    }
                }
                KeyCode::Backspace => {
                    model.backspace_search().await;
                }
                KeyCode::Char(c) => {
                    model.append_to_search(c).await;
                }
                _ => {}
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                model.set_should_quit(true).await;
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Char('/') => {
                model.set_active_section(ActiveSection::Search).await;
            }
            KeyCode::Up => {
                model.move_selection_up().await;
            }
            KeyCode::Down => {
                model.move_selection_down().await;
                self.maybe_load_next_page().await;
            }
            KeyCode::Enter => {
                self.play_selected().await;
            }
            KeyCode::Char('a') | KeyCode::Char('A') => {
                self.enqueue_selected().await;
            }
            KeyCode::Char(' ') => {
                self.spawn_toggle();
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.spawn_next_track();
            }
            KeyCode::Char('v') | KeyCode::Char('V') => {
                model.toggle_now_playing().await;
            }
            KeyCode::Char('h') | KeyCode::Char('H') => {
                model.toggle_help_popup().await;
            }
            KeyCode::Esc | KeyCode::Backspace => {
                if model.is_searching().await {
                    self.spawn_go_back();
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn spawn_search(&self) {
        let controller = self.clone();
        tokio::spawn(async move {
            controller.search_songs().await;
        });
    }

    fn spawn_go_back(&self) {
        let controller = self.clone();
        tokio::spawn(async move {
            controller.go_back_to_main().await;
        });
    }

    // Playback operations wait for any load in progress
    fn spawn_toggle(&self) {
        let controller = self.clone();
        tokio::spawn(async move {
            controller.toggle_playback().await;
        });
    }

    fn spawn_next_track(&self) {
        let controller = self.clone();
        tokio::spawn(async move {
            controller.next_track().await;
        });
    }
}
