//! Controller module - Application logic and event handling
//!
//! - `input`: key event handling
//! - `playback`: playback control methods
//! - `navigation`: catalog paging and search
//! - `player_events`: watcher that notices tracks ending on their own

mod input;
mod playback;
mod navigation;
mod player_events;

use std::sync::Arc;

use crate::model::{AppModel, PlaybackError};

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<AppModel>,
}

impl AppController {
    pub fn new(model: Arc<AppModel>) -> Self {
        Self { model }
    }

    pub(crate) fn format_error(error: &anyhow::Error) -> String {
        let error_str = format!("{:#}", error);

        if error_str.contains("error sending request") || error_str.contains("dns error") {
            "Could not reach the song catalog. Check your connection.".to_string()
        } else if error_str.contains("operation timed out") {
            "The song catalog took too long to answer.".to_string()
        } else if error_str.contains("429") {
            "Rate limited. Please wait a moment.".to_string()
        } else if error_str.contains("Could not parse search response") {
            "The song catalog sent an unexpected response.".to_string()
        } else {
            format!("Error: {}", error_str)
        }
    }

    pub(crate) fn format_playback_error(error: &PlaybackError) -> String {
        match error {
            PlaybackError::NoPlayableSource(name) => format!("\"{}\" can't be played", name),
            PlaybackError::Handle(e) if format!("{:#}", e).contains("Audio output unavailable") => {
                "No audio output available.".to_string()
            }
            other => other.to_string(),
        }
    }
}
