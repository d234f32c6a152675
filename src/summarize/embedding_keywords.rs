//! Keyword extraction by embedding similarity.
//!
//! Candidate phrases are the distinct n-grams of the text. Each candidate is
//! embedded with the same provider as the document, and candidates are
//! ranked by cosine similarity to the document embedding. The top `top_n`
//! are returned.
//!
//! Tokenization: lowercase runs of alphanumerics/underscores of at least two
//! characters. Stop words are removed from the token stream before n-grams
//! are formed, so a bigram may bridge a dropped stop word
//! ("detection of anomalies" → "detection anomalies").

use super::{KeywordExtractor, KeywordOptions};
use crate::embed::{EmbeddingProvider, ProviderError};
use std::collections::HashSet;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Embedding-ranked keyword extractor.
#[derive(Debug, Clone)]
pub struct EmbeddingKeywordExtractor<P> {
    provider: P,
    top_n: usize,
}

impl<P: EmbeddingProvider> EmbeddingKeywordExtractor<P> {
    /// Extractor returning the 5 best phrases.
    pub fn new(provider: P) -> Self {
        Self { provider, top_n: 5 }
    }

    /// Set how many phrases to return.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_lowercase)
        .collect()
}

/// Distinct n-grams in first-occurrence order.
fn candidates(text: &str, options: &KeywordOptions) -> Vec<String> {
    let stop = options
        .stop_words
        .as_ref()
        .map(|s| s.words())
        .unwrap_or_default();
    let tokens: Vec<String> = tokenize(text)
        .into_iter()
        .filter(|t| !stop.contains(t))
        .collect();

    let (min_n, max_n) = options.ngram_range;
    let min_n = min_n.max(1);

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for n in min_n..=max_n {
        for window in tokens.windows(n) {
            let phrase = window.join(" ");
            if seen.insert(phrase.clone()) {
                out.push(phrase);
            }
        }
    }
    out
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

impl<P: EmbeddingProvider> KeywordExtractor for EmbeddingKeywordExtractor<P> {
    fn extract_keywords(
        &self,
        text: &str,
        options: &KeywordOptions,
    ) -> Result<Vec<(String, f32)>, ProviderError> {
        let phrases = candidates(text, options);
        if phrases.is_empty() || self.top_n == 0 {
            return Ok(Vec::new());
        }

        let doc = self.provider.embed(text)?;
        let score = |phrase: &String| -> Result<f32, ProviderError> {
            Ok(cosine(&doc, &self.provider.embed(phrase)?))
        };

        #[cfg(feature = "parallel")]
        let scores: Vec<f32> = phrases
            .par_iter()
            .map(score)
            .collect::<Vec<_>>()
            .into_iter()
            .collect::<Result<_, _>>()?;

        #[cfg(not(feature = "parallel"))]
        let scores: Vec<f32> = phrases.iter().map(score).collect::<Result<_, _>>()?;

        let mut ranked: Vec<(String, f32)> = phrases.into_iter().zip(scores).collect();
        // Stable: equal scores keep first-occurrence order.
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(self.top_n);
        Ok(ranked)
    }
}
