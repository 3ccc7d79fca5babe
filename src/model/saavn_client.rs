//! Client for the song search endpoint

use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::ApiConfig;
use crate::{log_api_request, log_api_result};

use super::song::{SearchResponse, Song};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct SaavnClient {
    http: reqwest::Client,
    base_url: String,
}

impl SaavnClient {
    pub fn new(http: reqwest::Client, config: &ApiConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the shared HTTP client used for both search and audio downloads.
    pub fn http_client() -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")
    }

    pub fn search_url(&self) -> String {
        format!("{}/search/songs", self.base_url)
    }

    pub async fn search_songs(&self, query: &str, page: u32, limit: u32) -> Result<Vec<Song>> {
        log_api_request!("search_songs", query, page, limit);

        let result = self.fetch(query, page, limit).await;
        log_api_result!("search_songs", result);
        result
    }

    async fn fetch(&self, query: &str, page: u32, limit: u32) -> Result<Vec<Song>> {
        let page = page.to_string();
        let limit = limit.to_string();
        let response: SearchResponse = self
            .http
            .get(self.search_url())
            .query(&[("query", query), ("page", page.as_str()), ("limit", limit.as_str())])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context("Search request failed")?
            .error_for_status()
            .context("Search endpoint returned an error")?
            .json()
            .await
            .context("Could not parse search response")?;
        Ok(response.into_songs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_ignores_trailing_slash() {
        let config = ApiConfig {
            base_url: "http://localhost:3000/api/".to_string(),
            ..ApiConfig::default()
        };
        let client = SaavnClient::new(reqwest::Client::new(), &config);
        assert_eq!(client.search_url(), "http://localhost:3000/api/search/songs");
    }
}
