//! Model module - Application state and data types
//!
//! - `types`: UI focus and popup state
//! - `song`: song records and search response parsing
//! - `playback`: player status, timing and the render snapshot
//! - `player_store`: queue and audio handle ownership
//! - `catalog`: paginated listing and search with request tokens
//! - `saavn_client`: search endpoint client
//! - `app_model`: main application model

mod types;
mod song;
mod playback;
mod player_store;
mod catalog;
mod saavn_client;
mod app_model;

pub use types::{ActiveSection, UiState};

pub use song::Song;

pub use playback::{PlaybackInfo, PlayerStatus};

pub use player_store::{PlaybackError, PlaybackStore};

pub use catalog::{Catalog, FetchTicket};

pub use saavn_client::SaavnClient;

pub use app_model::{AppModel, CatalogView};
