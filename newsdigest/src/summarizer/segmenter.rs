use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Terminal punctuation followed by a whitespace run.
    static ref BOUNDARY: Regex = Regex::new(r"[.!?]\s+").expect("valid boundary regex");
}

/// Splits free text into sentences.
pub trait Segmenter: Send + Sync {
    /// Returns trimmed, non-empty sentences in text order.
    fn split(&self, text: &str) -> Vec<String>;
}

/// Punctuation-based splitter.
///
/// Cuts right after `.`, `!` or `?` when whitespace follows. It knows nothing about
/// abbreviations ("Dr. Smith"), decimals followed by a space, or terminators inside
/// quotes, so those over- or under-split.
#[derive(Debug, Clone, Copy, Default)]
pub struct PunctuationSegmenter;

impl Segmenter for PunctuationSegmenter {
    fn split(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        let text = text.replace(['\r', '\n'], " ");
        let mut sentences = Vec::new();
        let mut start = 0;

        for m in BOUNDARY.find_iter(&text) {
            // Terminators are ASCII, so the sentence ends one byte into the match
            push_trimmed(&mut sentences, &text[start..m.start() + 1]);
            start = m.end();
        }
        push_trimmed(&mut sentences, &text[start..]);

        sentences
    }
}

fn push_trimmed(out: &mut Vec<String>, fragment: &str) {
    let fragment = fragment.trim();
    if !fragment.is_empty() {
        out.push(fragment.to_string());
    }
}
