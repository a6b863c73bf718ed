use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Low-information words skipped while counting.
pub const STOP_WORDS: [&str; 25] = [
    "the", "and", "to", "of", "in", "a", "is", "for", "on", "that", "with", "as", "are", "was",
    "by", "it", "at", "from", "an", "be", "this", "which", "have", "has", "or",
];

/// Tokens shorter than this (in characters) are not counted.
const MIN_TOKEN_CHARS: usize = 2;

lazy_static! {
    // Letters, numbers and underscore only. Combining marks (`\p{M}`) break a word.
    static ref WORD: Regex = Regex::new(r"[\p{L}\p{N}_]+").expect("valid word regex");
    static ref STOP_SET: HashSet<&'static str> = STOP_WORDS.iter().copied().collect();
}

/// Lower-cases `text` and returns every maximal run of letters, digits and `_`.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD.find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn is_counted(token: &str) -> bool {
    token.chars().count() >= MIN_TOKEN_CHARS && !STOP_SET.contains(token)
}

/// Word counts over the whole sentence pool.
#[derive(Debug, Clone, Default)]
pub struct WordFrequencyTable {
    counts: HashMap<String, usize>,
}

impl WordFrequencyTable {
    pub fn build<'a, I>(sentences: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for sentence in sentences {
            for token in tokenize(sentence) {
                if is_counted(&token) {
                    *counts.entry(token).or_insert(0) += 1;
                }
            }
        }
        Self { counts }
    }

    pub fn count(&self, token: &str) -> usize {
        self.counts.get(token).copied().unwrap_or(0)
    }

    /// Sum of counts for every token of `sentence`, stop words included (they count 0).
    pub fn score(&self, sentence: &str) -> usize {
        tokenize(sentence).iter().map(|t| self.count(t)).sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
