//! Core type definitions for the UI

use std::time::Instant;

/// Which section of the UI is currently focused
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveSection {
    Search,
    Songs,
}

impl ActiveSection {
    pub fn next(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::Songs,
            ActiveSection::Songs => ActiveSection::Search,
        }
    }
}

/// UI state for the application
#[derive(Clone, Debug)]
pub struct UiState {
    pub active_section: ActiveSection,
    /// Text in the search box, applied on Enter
    pub search_input: String,
    pub selected: usize,
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
    pub show_help_popup: bool,
    pub show_now_playing: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            active_section: ActiveSection::Songs,
            search_input: String::new(),
            selected: 0,
            error_message: None,
            error_timestamp: None,
            show_help_popup: false,
            show_now_playing: false,
        }
    }
}
