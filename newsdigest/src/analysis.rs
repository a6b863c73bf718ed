//! LLM-backed credibility report
//!
//! Each article gets a fake-news verdict and a bias/credibility assessment from the
//! model; the combined records are saved as a JSON report and then handed back to
//! the model to write one balanced article.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::article::Article;
use crate::llm::{extract_json_from_text, LlmProvider, LlmRequest};

/// Fake-news verdict for one article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FakeNewsVerdict {
    pub label: String,
    pub confidence: f64,
}

impl FakeNewsVerdict {
    /// Verdict for articles with no text to judge
    pub fn unknown() -> Self {
        Self {
            label: "unknown".to_string(),
            confidence: 0.0,
        }
    }

    /// Verdict when the model cannot be reached or answers garbage
    pub fn uncertain() -> Self {
        Self {
            label: "UNCERTAIN".to_string(),
            confidence: 0.5,
        }
    }
}

/// Bias and credibility assessment for one article
///
/// Scores are read from numbers or numeric strings; any other value leaves the
/// score unset instead of rejecting the whole answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BiasAssessment {
    #[serde(default, deserialize_with = "loose_score")]
    pub bias_score: Option<f64>,
    #[serde(default, deserialize_with = "loose_score")]
    pub credibility_score: Option<f64>,
    #[serde(default, deserialize_with = "loose_text")]
    pub bias_description: Option<String>,
}

impl BiasAssessment {
    fn is_empty(&self) -> bool {
        self.bias_score.is_none() && self.credibility_score.is_none() && self.bias_description.is_none()
    }
}

fn loose_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    })
}

fn loose_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// One row of the analysis report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleAnalysis {
    pub title: Option<String>,
    pub source: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub fake_news_label: String,
    pub fake_confidence: f64,
    pub bias_score: Option<f64>,
    pub credibility_score: Option<f64>,
    pub bias_description: Option<String>,
}

impl ArticleAnalysis {
    pub fn new(article: &Article, verdict: FakeNewsVerdict, bias: BiasAssessment) -> Self {
        Self {
            title: article.title.clone(),
            source: article.source.name.clone(),
            url: article.url.clone(),
            published_at: article.published_at.clone(),
            description: article.description.clone(),
            content: article.content.clone(),
            fake_news_label: verdict.label,
            fake_confidence: verdict.confidence,
            bias_score: bias.bias_score,
            credibility_score: bias.credibility_score,
            bias_description: bias.bias_description,
        }
    }
}

/// Finished run: per-article rows, where they were saved, and the merged article
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub analyses: Vec<ArticleAnalysis>,
    pub report_path: PathBuf,
    pub balanced_article: String,
}

/// Asks the model whether `text` reads as fabricated.
///
/// Never fails: blank text is `unknown` without a model call, and any model or
/// parsing failure degrades to `UNCERTAIN`.
pub async fn detect_fake_news<P: LlmProvider + ?Sized>(provider: &P, text: &str) -> FakeNewsVerdict {
    if text.trim().is_empty() {
        return FakeNewsVerdict::unknown();
    }

    let prompt = format!(
        r#"You are an expert in misinformation detection.
Analyze the following text and determine if it is likely to be fake or factual.

Return ONLY a JSON object with these exact keys:
- label: one of ["FAKE", "REAL", "UNCERTAIN"]
- confidence: a number between 0 and 1 indicating confidence in your judgment

Text:
{}
"#,
        text
    );

    let response = match provider.generate(LlmRequest::new(prompt).with_temperature(0.2)).await {
        Ok(r) => r,
        Err(e) => {
            warn!("fake news detection failed: {}", e);
            return FakeNewsVerdict::uncertain();
        }
    };

    parse_json::<FakeNewsVerdict>(&response.content).unwrap_or_else(|| {
        warn!("fake news detection returned unparsable output");
        FakeNewsVerdict::uncertain()
    })
}

/// Asks the model for bias and credibility scores of an article from `source`.
///
/// When the answer holds no parsable JSON the raw text is kept as the description
/// and both scores stay empty. Transport errors propagate.
pub async fn analyze_bias_credibility<P: LlmProvider + ?Sized>(
    provider: &P,
    text: &str,
    source: &str,
) -> Result<BiasAssessment> {
    let prompt = format!(
        r#"You are a media analysis expert. Analyze the following news article from {}.
Return a JSON with these exact keys:
bias_score (0-100, where 0 = unbiased, 100 = heavily biased)
credibility_score (0-100, where 100 = highly credible)
bias_description

Article:
{}
"#,
        source, text
    );

    let response = provider
        .generate(LlmRequest::new(prompt).with_temperature(0.3))
        .await
        .with_context(|| format!("bias analysis failed for source {}", source))?;
    let raw = response.content.trim();

    // an answer with none of the expected keys counts as unparsable
    match parse_json::<BiasAssessment>(raw).filter(|b| !b.is_empty()) {
        Some(assessment) => Ok(assessment),
        None => {
            warn!(source, "bias answer was not usable JSON, keeping raw text");
            Ok(BiasAssessment {
                bias_description: Some(raw.to_string()),
                ..Default::default()
            })
        }
    }
}

/// Asks the model to write one neutral article out of the report JSON.
pub async fn merge_news_articles<P: LlmProvider + ?Sized>(provider: &P, report_json: &str) -> Result<String> {
    let prompt = format!(
        r#"You are a balanced journalist AI.
You are given multiple news reports about the same topic.
Each includes bias and credibility information.

Task:
- Write a single, factual, neutral, and well-balanced article that fairly represents all viewpoints.
- Summarize consistent facts across reports.
- If sources disagree, mention both perspectives clearly.
- Avoid political or emotional tone.

Input JSON:
{}
"#,
        report_json
    );

    let response = provider
        .generate(LlmRequest::new(prompt).with_max_tokens(2048))
        .await
        .context("failed to synthesize balanced article")?;
    Ok(response.content.trim().to_string())
}

/// Runs both assessments on one article.
pub async fn analyze_article<P: LlmProvider + ?Sized>(provider: &P, article: &Article) -> Result<ArticleAnalysis> {
    let text = article.body_text();
    let verdict = detect_fake_news(provider, text).await;
    let bias = analyze_bias_credibility(provider, text, article.source_name()).await?;
    Ok(ArticleAnalysis::new(article, verdict, bias))
}

/// Analyzes every article in order, writes the report into `output_dir`, then
/// synthesizes the balanced article from it.
pub async fn run_analysis<P: LlmProvider + ?Sized>(
    provider: &P,
    articles: &[Article],
    output_dir: &Path,
) -> Result<AnalysisReport> {
    let mut analyses = Vec::with_capacity(articles.len());
    for (i, article) in articles.iter().enumerate() {
        info!(
            "analyzing article {}/{}: {}",
            i + 1,
            articles.len(),
            article.title.as_deref().unwrap_or("Untitled")
        );
        analyses.push(analyze_article(provider, article).await?);
    }

    let report_json = serde_json::to_string_pretty(&analyses).context("failed to serialize analysis report")?;
    let report_path = output_dir.join(report_file_name(Local::now()));

    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("failed to create report directory: {}", output_dir.display()))?;
    tokio::fs::write(&report_path, &report_json)
        .await
        .with_context(|| format!("failed to write analysis report: {}", report_path.display()))?;
    info!(path = %report_path.display(), "saved analysis report");

    let balanced_article = merge_news_articles(provider, &report_json).await?;

    Ok(AnalysisReport {
        analyses,
        report_path,
        balanced_article,
    })
}

/// `news_analysis_YYYYmmdd_HHMMSS.json`
pub fn report_file_name(at: DateTime<Local>) -> String {
    format!("news_analysis_{}.json", at.format("%Y%m%d_%H%M%S"))
}

fn parse_json<T: for<'de> Deserialize<'de>>(text: &str) -> Option<T> {
    let candidate = extract_json_from_text(text).unwrap_or_else(|| text.trim().to_string());
    serde_json::from_str(&candidate).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmResponse, UsageMetadata};
    use chrono::TimeZone;
    use std::sync::Mutex;

    /// Replays canned answers and records prompts
    struct ScriptedProvider {
        answers: Mutex<Vec<Result<String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(answers: Vec<Result<String>>) -> Self {
            Self {
                answers: Mutex::new(answers.into_iter().rev().collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().expect("lock").clone()
        }
    }

    #[async_trait::async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn generate(&self, request: LlmRequest) -> Result<LlmResponse> {
            self.prompts.lock().expect("lock").push(request.prompt);
            let answer = self
                .answers
                .lock()
                .expect("lock")
                .pop()
                .unwrap_or_else(|| Err(anyhow::anyhow!("no scripted answer left")))?;
            Ok(LlmResponse {
                content: answer,
                usage: UsageMetadata::default(),
                model: "scripted".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn blank_text_is_unknown_without_model_call() {
        let provider = ScriptedProvider::new(vec![]);
        let verdict = detect_fake_news(&provider, "   ").await;
        assert_eq!(verdict, FakeNewsVerdict::unknown());
        assert!(provider.prompts().is_empty());
    }

    #[tokio::test]
    async fn fenced_verdict_is_parsed() {
        let provider = ScriptedProvider::new(vec![Ok(
            "```json\n{\"label\": \"REAL\", \"confidence\": 0.92}\n```".to_string(),
        )]);
        let verdict = detect_fake_news(&provider, "The council approved the budget.").await;
        assert_eq!(verdict.label, "REAL");
        assert!((verdict.confidence - 0.92).abs() < f64::EPSILON);
        assert!(provider.prompts()[0].contains("The council approved the budget."));
    }

    #[tokio::test]
    async fn verdict_degrades_to_uncertain() {
        let provider = ScriptedProvider::new(vec![
            Ok("I cannot decide.".to_string()),
            Err(anyhow::anyhow!("connection reset")),
        ]);
        assert_eq!(detect_fake_news(&provider, "text").await, FakeNewsVerdict::uncertain());
        assert_eq!(detect_fake_news(&provider, "text").await, FakeNewsVerdict::uncertain());
    }

    #[tokio::test]
    async fn bias_falls_back_to_raw_description() {
        let provider = ScriptedProvider::new(vec![Ok("  Mostly neutral reporting.  ".to_string())]);
        let bias = analyze_bias_credibility(&provider, "text", "Daily").await.expect("bias");
        assert_eq!(bias.bias_score, None);
        assert_eq!(bias.credibility_score, None);
        assert_eq!(bias.bias_description.as_deref(), Some("Mostly neutral reporting."));
        assert!(provider.prompts()[0].contains("news article from Daily"));
    }

    #[tokio::test]
    async fn bias_scores_accept_numeric_strings() {
        let provider = ScriptedProvider::new(vec![Ok(
            r#"{"bias_score": "40", "credibility_score": 70, "bias_description": "Slight lean"}"#.to_string(),
        )]);
        let bias = analyze_bias_credibility(&provider, "text", "Daily").await.expect("bias");
        assert_eq!(
            bias,
            BiasAssessment {
                bias_score: Some(40.0),
                credibility_score: Some(70.0),
                bias_description: Some("Slight lean".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn unreadable_score_keeps_other_fields() {
        let provider = ScriptedProvider::new(vec![Ok(
            r#"{"bias_score": "moderate", "credibility_score": "85%", "bias_description": "Opinion piece"}"#
                .to_string(),
        )]);
        let bias = analyze_bias_credibility(&provider, "text", "Daily").await.expect("bias");
        assert_eq!(bias.bias_score, None);
        assert_eq!(bias.credibility_score, Some(85.0));
        assert_eq!(bias.bias_description.as_deref(), Some("Opinion piece"));
    }

    #[tokio::test]
    async fn empty_object_falls_back_to_raw_description() {
        let provider = ScriptedProvider::new(vec![Ok("{}".to_string()), Ok(r#"{"verdict": "fine"}"#.to_string())]);
        let bias = analyze_bias_credibility(&provider, "text", "Daily").await.expect("bias");
        assert_eq!(bias.bias_description.as_deref(), Some("{}"));
        assert_eq!(bias.bias_score, None);

        let bias = analyze_bias_credibility(&provider, "text", "Daily").await.expect("bias");
        assert_eq!(bias.bias_description.as_deref(), Some(r#"{"verdict": "fine"}"#));
    }

    #[tokio::test]
    async fn bias_transport_error_propagates() {
        let provider = ScriptedProvider::new(vec![Err(anyhow::anyhow!("503"))]);
        assert!(analyze_bias_credibility(&provider, "text", "Daily").await.is_err());
    }

    #[tokio::test]
    async fn analyze_article_uses_description_when_content_missing() {
        let provider = ScriptedProvider::new(vec![
            Ok(r#"{"label": "FAKE", "confidence": 0.8}"#.to_string()),
            Ok(r#"{"bias_score": 70, "credibility_score": 20, "bias_description": "Sensational"}"#.to_string()),
        ]);
        let article = Article {
            title: Some("Aliens land".into()),
            description: Some("Aliens landed downtown.".into()),
            ..Default::default()
        };

        let analysis = analyze_article(&provider, &article).await.expect("analysis");
        assert_eq!(analysis.fake_news_label, "FAKE");
        assert_eq!(analysis.bias_score, Some(70.0));
        assert_eq!(analysis.credibility_score, Some(20.0));
        assert_eq!(analysis.source, None);

        let prompts = provider.prompts();
        assert!(prompts[0].contains("Aliens landed downtown."));
        assert!(prompts[1].contains("news article from Unknown"));
    }

    #[test]
    fn report_rows_use_published_at_key() {
        let article = Article {
            published_at: Some("2025-03-01T00:00:00Z".into()),
            ..Default::default()
        };
        let row = ArticleAnalysis::new(&article, FakeNewsVerdict::unknown(), BiasAssessment::default());
        let value = serde_json::to_value(&row).expect("serialize");
        assert_eq!(value["publishedAt"], "2025-03-01T00:00:00Z");
        assert_eq!(value["fake_news_label"], "unknown");
        assert!(value["bias_score"].is_null());
    }

    #[test]
    fn report_file_name_uses_timestamp() {
        let at = Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).single().expect("valid time");
        assert_eq!(report_file_name(at), "news_analysis_20250102_030405.json");
    }
}
