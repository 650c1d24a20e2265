//! Lexical rerank heuristic
//!
//! Adds a small, capped bonus to each chunk's similarity score for every
//! distinct lowercase whitespace token it shares with the query.

use std::collections::HashSet;

use crate::chunk::Chunk;

/// Token-overlap reranker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reranker {
    /// Bonus per shared token (default: 0.01)
    pub per_token_bonus: f32,
    /// Bonus ceiling (default: 0.25)
    pub max_bonus: f32,
}

impl Default for Reranker {
    fn default() -> Self {
        Self {
            per_token_bonus: 0.01,
            max_bonus: 0.25,
        }
    }
}

impl Reranker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rescore and sort `chunks` by adjusted score, highest first
    ///
    /// The sort is stable: chunks with equal adjusted scores keep their
    /// input order.
    pub fn rank(&self, query: &str, chunks: &[Chunk]) -> Vec<Chunk> {
        let query_tokens = tokens(query);
        let mut ranked: Vec<Chunk> = chunks
            .iter()
            .map(|chunk| chunk.with_score(chunk.score + self.bonus(&query_tokens, &chunk.text)))
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }

    /// [`rank`](Self::rank), keeping only the best `k`
    pub fn rank_top(&self, query: &str, chunks: &[Chunk], k: usize) -> Vec<Chunk> {
        let mut ranked = self.rank(query, chunks);
        ranked.truncate(k);
        ranked
    }

    fn bonus(&self, query_tokens: &HashSet<String>, text: &str) -> f32 {
        let overlap = tokens(text).intersection(query_tokens).count();
        (overlap as f32 * self.per_token_bonus).min(self.max_bonus)
    }
}

fn tokens(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::Modality;

    fn chunk(text: &str, score: f32) -> Chunk {
        Chunk::new(text, "doc1", Modality::Text).with_score(score)
    }

    #[test]
    fn test_overlap_bonus_reorders() {
        let chunks = vec![
            chunk("dogs are loyal companions", 0.5),
            chunk("cats are great pets", 0.5),
        ];
        let ranked = Reranker::default().rank("are cats pets", &chunks);

        assert_eq!(ranked[0].text, "cats are great pets");
        assert!((ranked[0].score - 0.53).abs() < 1e-6);
        assert_eq!(ranked[1].text, "dogs are loyal companions");
        assert!((ranked[1].score - 0.51).abs() < 1e-6);
    }

    #[test]
    fn test_tokens_are_case_insensitive_and_distinct() {
        let ranked = Reranker::default().rank("CATS cats Cats", &[chunk("cats cats", 0.0)]);
        assert!((ranked[0].score - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_bonus_is_capped() {
        let text: Vec<String> = (0..40).map(|i| format!("t{i}")).collect();
        let text = text.join(" ");
        let ranked = Reranker::default().rank(&text, &[chunk(&text, 0.2)]);
        assert!((ranked[0].score - 0.45).abs() < 1e-6);
    }

    #[test]
    fn test_equal_scores_keep_input_order() {
        let chunks = vec![
            chunk("first", 0.3),
            chunk("second", 0.3),
            chunk("third", 0.9),
            chunk("fourth", 0.3),
        ];
        let ranked = Reranker::default().rank("unrelated", &chunks);
        let order: Vec<&str> = ranked.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(order, vec!["third", "first", "second", "fourth"]);
    }

    #[test]
    fn test_scores_never_decrease() {
        let chunks = vec![chunk("a b c", 0.1), chunk("d e", -0.2), chunk("", 0.0)];
        let ranked = Reranker::default().rank("a d", &chunks);
        for original in &chunks {
            let adjusted = ranked.iter().find(|c| c.text == original.text).unwrap();
            assert!(adjusted.score >= original.score);
            assert!(adjusted.score - original.score <= 0.25 + 1e-6);
        }
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_rank_top_truncates() {
        let chunks = vec![chunk("x", 0.1), chunk("y", 0.2), chunk("z", 0.3)];
        let top = Reranker::default().rank_top("q", &chunks, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].text, "z");
        assert!(Reranker::default().rank("q", &[]).is_empty());
    }
}
