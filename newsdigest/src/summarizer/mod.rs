//! Extractive multi-article summarizer
//!
//! Builds one flat sentence pool from every article's title, description and content,
//! counts words across that pool, keeps the highest-scoring sentences and reassembles
//! them in document order under a heading and a source list.

use std::fmt;
use tracing::debug;

use crate::article::Article;

pub mod frequency;
pub mod segmenter;
pub mod selector;

pub use frequency::WordFrequencyTable;
pub use segmenter::{PunctuationSegmenter, Segmenter};
pub use selector::ScoredSentence;

pub const DEFAULT_MAX_SENTENCES: usize = 8;
pub const DEFAULT_HEADING: &str = "News Summary";

pub const NO_ARTICLES_MESSAGE: &str = "No articles found for the given query.";
pub const NO_USABLE_TEXT_MESSAGE: &str = "No usable text found in fetched articles.";
pub const EMPTY_SUMMARY_MESSAGE: &str = "Could not generate article from available sources.";

/// A pooled sentence with the name of the source it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    pub text: String,
    pub source: String,
    /// Position in the pool
    pub index: usize,
}

/// Flat, ordered sentence pool
#[derive(Debug, Clone, Default)]
pub struct SentencePool {
    sentences: Vec<Sentence>,
}

impl SentencePool {
    /// Segments title, description and content of each article, in that order.
    pub fn build<S: Segmenter + ?Sized>(articles: &[Article], segmenter: &S) -> Self {
        let mut sentences = Vec::new();
        for article in articles {
            let source = article.source_name();
            for field in article.text_fields().into_iter().flatten() {
                for text in segmenter.split(field) {
                    let index = sentences.len();
                    sentences.push(Sentence {
                        text,
                        source: source.to_string(),
                        index,
                    });
                }
            }
        }
        Self { sentences }
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.sentences.iter().map(|s| s.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

/// Assembled extractive summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub heading: String,
    /// Chosen sentences in pool order
    pub sentences: Vec<String>,
    /// Unique source names, first occurrence first
    pub sources: Vec<String>,
}

impl Summary {
    pub fn body(&self) -> String {
        self.sentences.join(" ")
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "**{}**\n\n{}\n\n**Sources:** {}",
            self.heading,
            self.body(),
            self.sources.join(", ")
        )
    }
}

/// Result of a summarization run. Only `Summary` carries content; the other
/// variants render as fixed messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    Summary(Summary),
    NoArticles,
    NoUsableText,
    EmptySummary,
}

impl SummaryOutcome {
    pub fn is_summary(&self) -> bool {
        matches!(self, SummaryOutcome::Summary(_))
    }
}

impl fmt::Display for SummaryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryOutcome::Summary(summary) => write!(f, "{}", summary),
            SummaryOutcome::NoArticles => f.write_str(NO_ARTICLES_MESSAGE),
            SummaryOutcome::NoUsableText => f.write_str(NO_USABLE_TEXT_MESSAGE),
            SummaryOutcome::EmptySummary => f.write_str(EMPTY_SUMMARY_MESSAGE),
        }
    }
}

/// Frequency-scoring extractive summarizer.
///
/// Holds no state between calls; each `summarize` builds its own pool and table.
pub struct Summarizer<S: Segmenter = PunctuationSegmenter> {
    segmenter: S,
    max_sentences: usize,
}

impl Default for Summarizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Summarizer {
    pub fn new() -> Self {
        Self::with_segmenter(PunctuationSegmenter)
    }
}

impl<S: Segmenter> Summarizer<S> {
    pub fn with_segmenter(segmenter: S) -> Self {
        Self {
            segmenter,
            max_sentences: DEFAULT_MAX_SENTENCES,
        }
    }

    pub fn with_max_sentences(mut self, max_sentences: usize) -> Self {
        self.max_sentences = max_sentences;
        self
    }

    pub fn summarize(&self, articles: &[Article]) -> SummaryOutcome {
        if articles.is_empty() {
            return SummaryOutcome::NoArticles;
        }

        let pool = SentencePool::build(articles, &self.segmenter);
        if pool.is_empty() {
            return SummaryOutcome::NoUsableText;
        }

        let table = WordFrequencyTable::build(pool.texts());
        let texts: Vec<&str> = pool.texts().collect();
        let scored = selector::score_sentences(&texts, &table);
        let k = self.max_sentences.min(pool.len());
        let chosen = selector::select_top(&scored, k);

        debug!(
            pool = pool.len(),
            vocabulary = table.len(),
            selected = chosen.len(),
            "scored sentence pool"
        );

        let sentences: Vec<String> = chosen
            .into_iter()
            .map(|i| pool.sentences()[i].text.clone())
            .collect();

        let summary = Summary {
            heading: heading(articles),
            sentences,
            sources: unique_sources(articles),
        };

        if summary.body().is_empty() {
            return SummaryOutcome::EmptySummary;
        }
        SummaryOutcome::Summary(summary)
    }
}

/// Summarizes with the default segmenter and sentence cap, rendered to text.
pub fn summarize_articles(articles: &[Article]) -> String {
    Summarizer::new().summarize(articles).to_string()
}

fn heading(articles: &[Article]) -> String {
    articles
        .iter()
        .filter_map(|a| a.title.as_deref())
        .find(|t| !t.is_empty())
        .unwrap_or(DEFAULT_HEADING)
        .to_string()
}

fn unique_sources(articles: &[Article]) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    for article in articles {
        let name = article.source_name();
        if !sources.iter().any(|s| s == name) {
            sources.push(name.to_string());
        }
    }
    sources
}
