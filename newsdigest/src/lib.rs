// Library interface for newsdigest modules
// This allows tests and the binary to import modules

pub mod analysis;
pub mod article;
pub mod ingestion;
pub mod llm;
pub mod pipeline;
pub mod summarizer;

pub use article::Article;
pub use summarizer::{summarize_articles, Summarizer, SummaryOutcome};
