//! Request/response wrapper around fetch + summarize.
//!
//! Input is a JSON object `{"query": ..., "num_articles": ...}`, output is a JSON
//! object `{"success", "content", "sources_count", "articles_analyzed"}`. Every
//! failure is reported inside the response rather than as an error.

use anyhow::Result;
use common::Config;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::ingestion::{GNewsClient, NewsSource};
use crate::summarizer::{Segmenter, Summarizer};

pub const DEFAULT_QUERY: &str = "news";
pub const DEFAULT_NUM_ARTICLES: u32 = 5;

/// Parsed request body.
///
/// Both fields are loose: a null or non-string `query` falls back to (or is
/// rendered as) text, and `num_articles` accepts a number or a numeric string.
/// Anything else for `num_articles` means "use the configured default".
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DigestRequest {
    #[serde(default = "default_query", deserialize_with = "loose_query")]
    pub query: String,
    #[serde(default, deserialize_with = "loose_count")]
    pub num_articles: Option<u32>,
}

fn default_query() -> String {
    DEFAULT_QUERY.to_string()
}

fn loose_query<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => default_query(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

fn loose_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestResponse {
    pub success: bool,
    pub content: String,
    pub sources_count: usize,
    pub articles_analyzed: usize,
}

impl DigestResponse {
    pub fn failure(content: impl Into<String>) -> Self {
        Self {
            success: false,
            content: content.into(),
            sources_count: 0,
            articles_analyzed: 0,
        }
    }
}

/// Fetches articles for the request and summarizes them.
///
/// A failed fetch is logged and summarized as an empty result set.
pub async fn run_digest<N, S>(
    source: &N,
    summarizer: &Summarizer<S>,
    request: &DigestRequest,
    default_num_articles: u32,
) -> DigestResponse
where
    N: NewsSource + ?Sized,
    S: Segmenter,
{
    let max = request.num_articles.unwrap_or(default_num_articles);
    let articles = match source.search(&request.query, max).await {
        Ok(articles) => articles,
        Err(e) => {
            warn!("error fetching news: {:#}", e);
            Vec::new()
        }
    };

    let outcome = summarizer.summarize(&articles);
    info!(
        query = %request.query,
        articles = articles.len(),
        summarized = outcome.is_summary(),
        "digest complete"
    );

    DigestResponse {
        success: true,
        content: outcome.to_string(),
        sources_count: articles.len(),
        articles_analyzed: articles.len(),
    }
}

/// Handles one raw request body end to end.
///
/// `source` is the already-built news client, or the error that prevented
/// building it; that error is only reported once the request itself parsed.
pub async fn handle_request<S: Segmenter>(
    input: &str,
    source: Result<&dyn NewsSource>,
    summarizer: &Summarizer<S>,
    default_num_articles: u32,
) -> DigestResponse {
    let request: DigestRequest = match serde_json::from_str(input) {
        Ok(r) => r,
        Err(e) => return DigestResponse::failure(format!("Invalid JSON input: {}", e)),
    };

    match source {
        Ok(source) => run_digest(source, summarizer, &request, default_num_articles).await,
        Err(e) => DigestResponse::failure(format!("Error: {:#}", e)),
    }
}

/// Everything a digest run needs, built from configuration.
pub struct DigestSetup {
    pub client: GNewsClient,
    pub summarizer: Summarizer,
    pub default_num_articles: u32,
}

impl DigestSetup {
    pub fn from_config(config: &Config) -> Result<Self> {
        let news = config.news.clone().unwrap_or_default();
        Ok(Self {
            client: GNewsClient::from_config(&news)?,
            summarizer: Summarizer::new().with_max_sentences(config.max_sentences()),
            default_num_articles: news.default_max_articles.unwrap_or(DEFAULT_NUM_ARTICLES),
        })
    }
}

/// Answers one request body given the outcome of loading configuration and
/// building the client. Config and setup errors become failure responses.
pub async fn brief_response(input: &str, setup: Result<DigestSetup>) -> DigestResponse {
    match setup {
        Ok(setup) => {
            handle_request(
                input,
                Ok(&setup.client as &dyn NewsSource),
                &setup.summarizer,
                setup.default_num_articles,
            )
            .await
        }
        Err(e) => handle_request(input, Err(e), &Summarizer::new(), DEFAULT_NUM_ARTICLES).await,
    }
}
