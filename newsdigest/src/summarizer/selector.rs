//! Frequency-based sentence ranking
//!
//! Every pooled sentence is scored against the pool-wide word counts, the best
//! `k` are kept, and the survivors are handed back in document order.

use super::frequency::WordFrequencyTable;

/// A pooled sentence and its frequency score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredSentence {
    /// Position in the sentence pool
    pub index: usize,
    pub score: usize,
}

/// Scores each sentence; output is in pool order.
pub fn score_sentences<S: AsRef<str>>(
    sentences: &[S],
    table: &WordFrequencyTable,
) -> Vec<ScoredSentence> {
    sentences
        .iter()
        .enumerate()
        .map(|(index, sentence)| ScoredSentence {
            index,
            score: table.score(sentence.as_ref()),
        })
        .collect()
}

/// Picks the `k` highest-scoring sentences and returns their pool indices ascending.
///
/// Ranking is a stable sort on descending score, so among equal scores the sentence
/// that appears earlier in the pool wins.
pub fn select_top(scored: &[ScoredSentence], k: usize) -> Vec<usize> {
    let mut ranked = scored.to_vec();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));

    let mut chosen: Vec<usize> = ranked.iter().take(k).map(|s| s.index).collect();
    chosen.sort_unstable();
    chosen
}
