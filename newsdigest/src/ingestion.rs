use anyhow::{Context, Result};
use common::NewsConfig;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;
use url::Url;

use crate::article::Article;

pub const DEFAULT_SEARCH_URL: &str = "https://gnews.io/api/v4/search";
pub const DEFAULT_API_KEY_ENV: &str = "GNEWS_API_KEY";
pub const DEFAULT_LANG: &str = "en";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Anything that can answer a news search query
#[async_trait::async_trait]
pub trait NewsSource: Send + Sync {
    /// Return up to `max` articles matching `query`, in relevance order.
    async fn search(&self, query: &str, max: u32) -> Result<Vec<Article>>;
}

/// Client for the GNews search API. One GET per search, no retries.
pub struct GNewsClient {
    client: Client,
    search_url: String,
    api_key: String,
    lang: String,
}

impl GNewsClient {
    pub fn new(
        search_url: impl Into<String>,
        api_key: impl Into<String>,
        lang: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("newsdigest/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            client,
            search_url: search_url.into(),
            api_key: api_key.into(),
            lang: lang.into(),
        })
    }

    /// Builds a client from the `[news]` table; the API key comes from the
    /// environment variable it names.
    pub fn from_config(config: &NewsConfig) -> Result<Self> {
        let key_env = config.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV);
        let api_key = std::env::var(key_env)
            .with_context(|| format!("news API key env var '{}' not set", key_env))?;

        Self::new(
            config.api_url.as_deref().unwrap_or(DEFAULT_SEARCH_URL),
            api_key,
            config.lang.as_deref().unwrap_or(DEFAULT_LANG),
            config.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS),
        )
    }

    fn search_url(&self, query: &str, max: u32) -> Result<Url> {
        let max = max.to_string();
        Url::parse_with_params(
            &self.search_url,
            [
                ("q", query),
                ("lang", self.lang.as_str()),
                ("max", max.as_str()),
                ("apikey", self.api_key.as_str()),
            ],
        )
        .with_context(|| format!("invalid news search URL: {}", self.search_url))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[async_trait::async_trait]
impl NewsSource for GNewsClient {
    async fn search(&self, query: &str, max: u32) -> Result<Vec<Article>> {
        let url = self.search_url(query, max)?;
        info!(query, max, "fetching news articles");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("news search request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("news search failed with status {}: {}", status, body);
        }

        let body: SearchResponse = response
            .json()
            .await
            .context("failed to decode news search response")?;

        info!(count = body.articles.len(), "retrieved articles");
        Ok(body.articles)
    }
}
