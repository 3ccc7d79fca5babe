//! Catalog paging and search

use crate::model::{ActiveSection, FetchTicket};

use super::AppController;

impl AppController {
    /// Load a catalog page. Ignored while another catalog request runs.
    pub async fn load_songs(&self, page: u32) {
        match self.model.begin_page_load(page).await {
            Some(ticket) => self.run_fetch(ticket).await,
            None => tracing::debug!(page, "Page load skipped"),
        }
    }

    /// Infinite scroll: fetch the next page in the background when the
    /// selection nears the end of the list.
    pub async fn maybe_load_next_page(&self) {
        if let Some(ticket) = self.model.begin_next_page().await {
            tracing::debug!(page = ticket.page, "Loading next catalog page");
            let controller = self.clone();
            tokio::spawn(async move {
                controller.run_fetch(ticket).await;
            });
        }
    }

    pub async fn search_songs(&self) {
        let Some(ticket) = self.model.begin_search().await else {
            tracing::debug!("Empty search query, nothing to do");
            return;
        };
        tracing::debug!(query = %ticket.query, "Performing search");
        self.model.set_active_section(ActiveSection::Songs).await;
        self.run_fetch(ticket).await;
    }

    pub async fn go_back_to_main(&self) {
        tracing::debug!("Leaving search, reloading catalog");
        let ticket = self.model.go_back_to_main().await;
        self.run_fetch(ticket).await;
    }

    async fn run_fetch(&self, ticket: FetchTicket) {
        let limit = self.model.page_size().await;
        match self.model.client.search_songs(&ticket.query, ticket.page, limit).await {
            Ok(songs) => {
                let count = songs.len();
                if let Some(total) = self.model.complete_fetch(&ticket, songs).await {
                    tracing::info!(
                        query = %ticket.query,
                        page = ticket.page,
                        received = count,
                        total,
                        "Catalog updated"
                    );
                }
            }
            Err(e) => {
                tracing::error!(query = %ticket.query, page = ticket.page, error = %e, "Catalog fetch failed");
                if self.model.fail_fetch(&ticket).await {
                    self.model.set_error(Self::format_error(&e)).await;
                }
            }
        }
    }
}
