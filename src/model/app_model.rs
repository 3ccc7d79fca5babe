//! Main application model with state management

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use super::catalog::{Catalog, FetchTicket};
use super::playback::PlaybackInfo;
use super::player_store::PlaybackStore;
use super::saavn_client::SaavnClient;
use super::song::Song;
use super::types::{ActiveSection, UiState};

const ERROR_DISPLAY_SECS: u64 = 5;

/// Catalog data as seen by the view
#[derive(Clone, Debug, Default)]
pub struct CatalogView {
    pub songs: Vec<Song>,
    pub mode_label: String,
    pub is_searching: bool,
    pub is_loading: bool,
}

/// Main application model containing all state
pub struct AppModel {
    pub client: SaavnClient,
    pub player: Arc<PlaybackStore>,
    catalog: Arc<Mutex<Catalog>>,
    ui_state: Arc<Mutex<UiState>>,
    should_quit: Arc<Mutex<bool>>,
}

impl AppModel {
    pub fn new(client: SaavnClient, player: Arc<PlaybackStore>, catalog: Catalog) -> Self {
        Self {
            client,
            player,
            catalog: Arc::new(Mutex::new(catalog)),
            ui_state: Arc::new(Mutex::new(UiState::default())),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    pub async fn begin_page_load(&self, page: u32) -> Option<FetchTicket> {
        self.catalog.lock().await.begin_page_load(page)
    }

    /// Next page ticket when the selection is near the end of the list.
    pub async fn begin_next_page(&self) -> Option<FetchTicket> {
        let selected = self.ui_state.lock().await.selected;
        self.catalog.lock().await.begin_next_page(selected)
    }

    /// Submit the search box. `None` when the input is blank.
    pub async fn begin_search(&self) -> Option<FetchTicket> {
        let input = self.ui_state.lock().await.search_input.clone();
        self.catalog.lock().await.begin_search(&input)
    }

    pub async fn go_back_to_main(&self) -> FetchTicket {
        let ticket = self.catalog.lock().await.go_back_to_main();
        let mut state = self.ui_state.lock().await;
        state.search_input.clear();
        state.selected = 0;
        ticket
    }

    /// Commit fetched songs and hand a changed, non-empty list to the
    /// playback queue. Returns the new list length, `None` when nothing changed.
    pub async fn complete_fetch(&self, ticket: &FetchTicket, songs: Vec<Song>) -> Option<usize> {
        let list = self.catalog.lock().await.complete(ticket, songs)?;
        let len = list.len();
        {
            let mut state = self.ui_state.lock().await;
            if ticket.page <= 1 {
                state.selected = 0;
            }
            state.selected = state.selected.min(len.saturating_sub(1));
        }
        if len > 0 {
            self.player.set_queue(list).await;
        }
        Some(len)
    }

    pub async fn fail_fetch(&self, ticket: &FetchTicket) -> bool {
        self.catalog.lock().await.fail(ticket)
    }

    pub async fn page_size(&self) -> u32 {
        self.catalog.lock().await.page_size()
    }

    pub async fn is_searching(&self) -> bool {
        self.catalog.lock().await.is_searching
    }

    pub async fn get_catalog_view(&self) -> CatalogView {
        let catalog = self.catalog.lock().await;
        CatalogView {
            songs: catalog.songs.clone(),
            mode_label: catalog.mode_label(),
            is_searching: catalog.is_searching,
            is_loading: catalog.is_loading(),
        }
    }

    /// The highlighted row and its position in the list
    pub async fn get_selected_song(&self) -> Option<(usize, Song)> {
        let selected = self.ui_state.lock().await.selected;
        let catalog = self.catalog.lock().await;
        catalog.songs.get(selected).cloned().map(|song| (selected, song))
    }

    // ========================================================================
    // Playback
    // ========================================================================

    pub async fn get_playback_info(&self) -> PlaybackInfo {
        self.player.snapshot().await
    }

    // ========================================================================
    // UI state
    // ========================================================================

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }

    pub async fn cycle_section(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.next();
    }

    pub async fn set_active_section(&self, section: ActiveSection) {
        self.ui_state.lock().await.active_section = section;
    }

    pub async fn move_selection_up(&self) {
        let mut state = self.ui_state.lock().await;
        state.selected = state.selected.saturating_sub(1);
    }

    pub async fn move_selection_down(&self) {
        let len = self.catalog.lock().await.songs.len();
        let mut state = self.ui_state.lock().await;
        if state.selected + 1 < len {
            state.selected += 1;
        }
    }

    pub async fn append_to_search(&self, c: char) {
        self.ui_state.lock().await.search_input.push(c);
    }

    pub async fn backspace_search(&self) {
        self.ui_state.lock().await.search_input.pop();
    }

    pub async fn set_error(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        state.error_message = Some(message);
        state.error_timestamp = Some(Instant::now());
    }

    pub async fn clear_error(&self) {
        let mut state = self.ui_state.lock().await;
        state.error_message = None;
        state.error_timestamp = None;
    }

    pub async fn has_error(&self) -> bool {
        self.ui_state.lock().await.error_message.is_some()
    }

    pub async fn auto_clear_old_errors(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(timestamp) = state.error_timestamp {
            if timestamp.elapsed().as_secs() > ERROR_DISPLAY_SECS {
                state.error_message = None;
                state.error_timestamp = None;
            }
        }
    }

    pub async fn toggle_help_popup(&self) {
        let mut state = self.ui_state.lock().await;
        state.show_help_popup = !state.show_help_popup;
    }

    pub async fn is_help_popup_open(&self) -> bool {
        self.ui_state.lock().await.show_help_popup
    }

    pub async fn toggle_now_playing(&self) {
        let mut state = self.ui_state.lock().await;
        state.show_now_playing = !state.show_now_playing;
    }

    pub async fn is_now_playing_open(&self) -> bool {
        self.ui_state.lock().await.show_now_playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::fake::FakeBackend;
    use crate::config::ApiConfig;
    use crate::model::song::test_song;

    fn model() -> AppModel {
        let client = SaavnClient::new(reqwest::Client::new(), &ApiConfig::default());
        let player = Arc::new(PlaybackStore::new(Arc::new(FakeBackend::default())));
        AppModel::new(client, player, Catalog::new("arijit", 20))
    }

    #[tokio::test]
    async fn blank_search_input_issues_no_request() {
        let model = model();
        model.append_to_search(' ').await;
        assert!(model.begin_search().await.is_none());
        assert!(!model.get_catalog_view().await.is_loading);
    }

    #[tokio::test]
    async fn selection_stays_within_the_list() {
        let model = model();
        let ticket = model.begin_page_load(1).await.unwrap();
        let songs = vec![test_song("a"), test_song("b")];
        model.complete_fetch(&ticket, songs).await.unwrap();

        for _ in 0..5 {
            model.move_selection_down().await;
        }
        assert_eq!(model.get_selected_song().await.unwrap().0, 1);
        for _ in 0..5 {
            model.move_selection_up().await;
        }
        assert_eq!(model.get_selected_song().await.unwrap().1.id, "a");
    }

    #[tokio::test]
    async fn go_back_clears_search_input() {
        let model = model();
        for c in "tum".chars() {
            model.append_to_search(c).await;
        }
        let search = model.begin_search().await.unwrap();
        assert_eq!(search.query, "tum");
        assert!(!model.is_searching().await);

        model.complete_fetch(&search, vec![test_song("s")]).await.unwrap();
        assert!(model.is_searching().await);

        let back = model.go_back_to_main().await;
        assert_eq!(back.query, "arijit");
        assert!(model.get_ui_state().await.search_input.is_empty());
        assert!(model.is_searching().await);

        model.complete_fetch(&back, vec![test_song("a")]).await.unwrap();
        assert!(!model.is_searching().await);
        assert_eq!(model.get_catalog_view().await.mode_label, "Catalog: arijit");
    }

    #[tokio::test]
    async fn committed_pages_replace_the_playback_queue() {
        let model = model();
        let first = model.begin_page_load(1).await.unwrap();
        let page: Vec<Song> = (0..20).map(|i| test_song(&format!("a{i}"))).collect();
        assert_eq!(model.complete_fetch(&first, page).await, Some(20));
        assert_eq!(model.get_playback_info().await.queue_len, 20);

        let second = model.begin_page_load(2).await.unwrap();
        assert_eq!(model.complete_fetch(&second, vec![test_song("b0")]).await, Some(21));
        assert_eq!(model.get_playback_info().await.queue_len, 21);
    }

    #[tokio::test]
    async fn empty_results_leave_the_queue_alone() {
        let model = model();
        let first = model.begin_page_load(1).await.unwrap();
        model.complete_fetch(&first, vec![test_song("a"), test_song("b")]).await.unwrap();

        for c in "zzz".chars() {
            model.append_to_search(c).await;
        }
        let search = model.begin_search().await.unwrap();
        assert_eq!(model.complete_fetch(&search, Vec::new()).await, Some(0));
        assert!(model.get_catalog_view().await.songs.is_empty());
        assert_eq!(model.get_playback_info().await.queue_len, 2);
    }

    #[tokio::test]
    async fn stale_results_never_reach_the_queue() {
        let model = model();
        let page = model.begin_page_load(1).await.unwrap();
        for c in "tum".chars() {
            model.append_to_search(c).await;
        }
        let search = model.begin_search().await.unwrap();

        assert_eq!(model.complete_fetch(&page, vec![test_song("old")]).await, None);
        assert_eq!(model.get_playback_info().await.queue_len, 0);

        model.complete_fetch(&search, vec![test_song("s0"), test_song("s1")]).await.unwrap();
        assert_eq!(model.get_playback_info().await.queue_len, 2);
    }
}
