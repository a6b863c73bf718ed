use serde::{Deserialize, Serialize};

/// Source name used when the search API does not report one
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// Publisher block as nested by the news search API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleSource {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// A single search hit. Every text field may be absent or empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub source: ArticleSource,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "publishedAt")]
    pub published_at: Option<String>,
}

impl Article {
    pub fn source_name(&self) -> &str {
        self.source.name.as_deref().unwrap_or(UNKNOWN_SOURCE)
    }

    /// Title, description and content, in the order they feed the sentence pool.
    pub fn text_fields(&self) -> [Option<&str>; 3] {
        [
            self.title.as_deref(),
            self.description.as_deref(),
            self.content.as_deref(),
        ]
    }

    /// Body text handed to the LLM: content, else description, else empty.
    pub fn body_text(&self) -> &str {
        [self.content.as_deref(), self.description.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_search_api_shape() {
        let json = r#"{
            "title": "Storm hits coast",
            "description": null,
            "content": "Heavy rain. Flooding reported.",
            "url": "https://example.com/storm",
            "image": "https://example.com/storm.jpg",
            "publishedAt": "2025-01-02T03:04:05Z",
            "source": {"name": "Coast Daily", "url": "https://example.com"}
        }"#;

        let article: Article = serde_json::from_str(json).expect("decode article");
        assert_eq!(article.title.as_deref(), Some("Storm hits coast"));
        assert!(article.description.is_none());
        assert_eq!(article.source_name(), "Coast Daily");
        assert_eq!(article.published_at.as_deref(), Some("2025-01-02T03:04:05Z"));
    }

    #[test]
    fn missing_source_is_unknown() {
        let article: Article = serde_json::from_str(r#"{"title": "Bare"}"#).expect("decode");
        assert_eq!(article.source_name(), UNKNOWN_SOURCE);
    }

    #[test]
    fn body_text_prefers_content() {
        let mut article = Article {
            description: Some("desc".into()),
            content: Some("".into()),
            ..Default::default()
        };
        assert_eq!(article.body_text(), "desc");

        article.content = Some("body".into());
        assert_eq!(article.body_text(), "body");

        article.description = None;
        article.content = None;
        assert_eq!(article.body_text(), "");
    }
}
