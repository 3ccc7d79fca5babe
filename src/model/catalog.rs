//! Catalog listing and search state with request tokens
//!
//! Each fetch is started with a [`FetchTicket`]. Only the ticket matching the
//! current in-flight token may commit its results; anything else is stale
//! and dropped.

use super::song::Song;

/// How close to the end of the list the selection must be before the next
/// page is requested.
pub const LOAD_MORE_THRESHOLD: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchKind {
    Page(u32),
    Search,
}

/// Permission to run one catalog request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    pub token: u64,
    pub kind: FetchKind,
    pub query: String,
    pub page: u32,
}

#[derive(Clone, Debug)]
pub struct Catalog {
    pub songs: Vec<Song>,
    pub page: u32,
    pub search_query: String,
    pub is_searching: bool,
    pub has_more: bool,
    default_query: String,
    page_size: u32,
    in_flight: Option<u64>,
    next_token: u64,
}

impl Catalog {
    pub fn new(default_query: impl Into<String>, page_size: u32) -> Self {
        Self {
            songs: Vec::new(),
            page: 0,
            search_query: String::new(),
            is_searching: false,
            has_more: true,
            default_query: default_query.into(),
            page_size: page_size.max(1),
            in_flight: None,
            next_token: 1,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    fn issue(&mut self, kind: FetchKind, query: String, page: u32) -> FetchTicket {
        let token = self.next_token;
        self.next_token += 1;
        self.in_flight = Some(token);
        FetchTicket { token, kind, query, page }
    }

    /// Start loading a catalog page. Rejected while another request runs.
    pub fn begin_page_load(&mut self, page: u32) -> Option<FetchTicket> {
        if self.in_flight.is_some() {
            tracing::debug!(page, "Catalog request already in flight, skipping page load");
            return None;
        }
        let query = self.default_query.clone();
        Some(self.issue(FetchKind::Page(page.max(1)), query, page.max(1)))
    }

    /// Next page for infinite scroll, if scrolling may load more.
    pub fn begin_next_page(&mut self, selected: usize) -> Option<FetchTicket> {
        if self.is_searching || !self.has_more || self.songs.is_empty() {
            return None;
        }
        if selected + LOAD_MORE_THRESHOLD < self.songs.len() {
            return None;
        }
        self.begin_page_load(self.page + 1)
    }

    /// Start a search for `query`, superseding any running request.
    ///
    /// Returns `None` without touching any state when the query is blank.
    /// Search mode is only entered once the results arrive.
    pub fn begin_search(&mut self, query: &str) -> Option<FetchTicket> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        Some(self.issue(FetchKind::Search, query.to_string(), 1))
    }

    /// Request the unfiltered first page, superseding any running request.
    ///
    /// Search mode is left when that page commits; a failed reload keeps the
    /// current search listing as it is.
    pub fn go_back_to_main(&mut self) -> FetchTicket {
        let query = self.default_query.clone();
        self.issue(FetchKind::Page(1), query, 1)
    }

    /// Apply a successful response.
    ///
    /// Returns the new list when it changed, `None` for stale tickets.
    pub fn complete(&mut self, ticket: &FetchTicket, results: Vec<Song>) -> Option<Vec<Song>> {
        if self.in_flight != Some(ticket.token) {
            tracing::debug!(token = ticket.token, "Discarding stale catalog response");
            return None;
        }
        self.in_flight = None;
        let received = results.len();
        match ticket.kind {
            FetchKind::Page(page) if page > 1 => {
                if results.is_empty() {
                    self.has_more = false;
                    return None;
                }
                self.songs.extend(results);
                self.page = page;
            }
            FetchKind::Page(_) => {
                self.songs = results;
                self.page = 1;
                self.is_searching = false;
                self.search_query.clear();
            }
            FetchKind::Search => {
                self.songs = results;
                self.page = 1;
                self.is_searching = true;
                self.search_query = ticket.query.clone();
            }
        }
        self.has_more = received >= self.page_size as usize;
        Some(self.songs.clone())
    }

    /// Clear the in-flight token after a failed request. The list is kept.
    pub fn fail(&mut self, ticket: &FetchTicket) -> bool {
        if self.in_flight == Some(ticket.token) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    /// Title for the list pane
    pub fn mode_label(&self) -> String {
        if self.is_searching {
            format!("Search: {}", self.search_query.trim())
        } else {
            format!("Catalog: {}", self.default_query)
        }
    }
}
