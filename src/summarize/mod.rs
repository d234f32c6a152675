//! Per-cluster keyword summaries.
//!
//! For each cluster label present, the member abstracts are joined into one
//! text and handed to a [`KeywordExtractor`]. The extractor decides how many
//! phrases come back and in what order; this module keeps them as returned.
//!
//! The extraction logic itself is pluggable: use
//! [`EmbeddingKeywordExtractor`] for embedding-ranked candidate phrases, or
//! wrap any closure with [`from_fn`].

mod embedding_keywords;

pub use embedding_keywords::EmbeddingKeywordExtractor;

use crate::corpus::Paper;
use crate::embed::ProviderError;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Stop-word list applied to candidate phrases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopWords {
    /// The `stop-words` crate's English list.
    English,
    /// A caller-supplied list.
    Custom(Vec<String>),
}

impl StopWords {
    /// Lowercased stop-word set.
    pub fn words(&self) -> HashSet<String> {
        match self {
            StopWords::English => stop_words::get(stop_words::LANGUAGE::English)
                .into_iter()
                .map(|w| w.to_lowercase())
                .collect(),
            StopWords::Custom(words) => words.iter().map(|w| w.to_lowercase()).collect(),
        }
    }
}

/// Options passed to the extractor on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordOptions {
    /// Inclusive (min, max) phrase length in tokens.
    pub ngram_range: (usize, usize),
    /// Stop words to drop before building phrases.
    pub stop_words: Option<StopWords>,
}

impl Default for KeywordOptions {
    fn default() -> Self {
        Self {
            ngram_range: (1, 2),
            stop_words: Some(StopWords::English),
        }
    }
}

impl KeywordOptions {
    /// Set the phrase length range.
    pub fn with_ngram_range(mut self, min: usize, max: usize) -> Self {
        self.ngram_range = (min, max);
        self
    }

    /// Set the stop-word list (`None` keeps every token).
    pub fn with_stop_words(mut self, stop_words: Option<StopWords>) -> Self {
        self.stop_words = stop_words;
        self
    }
}

/// A keyword extraction model: text → phrases ranked by relevance.
pub trait KeywordExtractor: Send + Sync {
    /// Extract `(phrase, score)` pairs, most relevant first.
    fn extract_keywords(
        &self,
        text: &str,
        options: &KeywordOptions,
    ) -> std::result::Result<Vec<(String, f32)>, ProviderError>;
}

impl<K: KeywordExtractor + ?Sized> KeywordExtractor for &K {
    fn extract_keywords(
        &self,
        text: &str,
        options: &KeywordOptions,
    ) -> std::result::Result<Vec<(String, f32)>, ProviderError> {
        (**self).extract_keywords(text, options)
    }
}

impl<K: KeywordExtractor + ?Sized> KeywordExtractor for Box<K> {
    fn extract_keywords(
        &self,
        text: &str,
        options: &KeywordOptions,
    ) -> std::result::Result<Vec<(String, f32)>, ProviderError> {
        (**self).extract_keywords(text, options)
    }
}

/// A function-based extractor.
#[derive(Clone)]
pub struct FnExtractor<F> {
    f: F,
}

impl<F> FnExtractor<F> {
    /// Create an extractor from a function.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> KeywordExtractor for FnExtractor<F>
where
    F: Fn(&str, &KeywordOptions) -> std::result::Result<Vec<(String, f32)>, ProviderError>
        + Send
        + Sync,
{
    fn extract_keywords(
        &self,
        text: &str,
        options: &KeywordOptions,
    ) -> std::result::Result<Vec<(String, f32)>, ProviderError> {
        (self.f)(text, options)
    }
}

/// Create an extractor from a closure.
pub fn from_fn<F>(f: F) -> FnExtractor<F>
where
    F: Fn(&str, &KeywordOptions) -> std::result::Result<Vec<(String, f32)>, ProviderError>
        + Send
        + Sync,
{
    FnExtractor::new(f)
}

/// Keywords for one cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    /// Cluster label.
    pub cluster_id: usize,
    /// Number of papers carrying the label.
    pub paper_count: usize,
    /// Phrases in the extractor's ranking order.
    pub keywords: Vec<String>,
}

/// Member abstracts per cluster label, joined with a single space.
///
/// Only labels that actually occur are present, in ascending order.
pub fn cluster_texts(papers: &[Paper]) -> BTreeMap<usize, (usize, String)> {
    let mut groups: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
    for p in papers {
        groups.entry(p.cluster).or_default().push(&p.abstract_text);
    }
    groups
        .into_iter()
        .map(|(id, texts)| (id, (texts.len(), texts.join(" "))))
        .collect()
}

/// Summarize every cluster present in `papers`.
pub fn summarize_clusters<K: KeywordExtractor + ?Sized>(
    papers: &[Paper],
    extractor: &K,
    options: &KeywordOptions,
) -> Result<Vec<ClusterSummary>> {
    let mut summaries = Vec::new();

    for (cluster_id, (paper_count, text)) in cluster_texts(papers) {
        let keywords = extractor
            .extract_keywords(&text, options)
            .map_err(|e| Error::KeywordFailure {
                cluster: cluster_id,
                cause: e.to_string(),
            })?
            .into_iter()
            .map(|(phrase, _)| phrase)
            .collect::<Vec<_>>();

        tracing::debug!(
            cluster = cluster_id,
            paper_count,
            keywords = keywords.len(),
            "cluster summarized"
        );
        summaries.push(ClusterSummary {
            cluster_id,
            paper_count,
            keywords,
        });
    }

    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::PaperRecord;

    fn paper(text: &str, cluster: usize) -> Paper {
        PaperRecord::new(text, vec![])
            .with_embedding(vec![0.0])
            .with_cluster(cluster)
    }

    /// Splits on whitespace and scores by position.
    fn word_extractor() -> FnExtractor<
        impl Fn(&str, &KeywordOptions) -> std::result::Result<Vec<(String, f32)>, ProviderError>
            + Send
            + Sync,
    > {
        from_fn(|text: &str, _: &KeywordOptions| {
            Ok(text
                .split_whitespace()
                .enumerate()
                .map(|(i, w)| (w.to_string(), 1.0 / (i + 1) as f32))
                .collect())
        })
    }

    #[test]
    fn test_single_paper_cluster() {
        let papers = vec![paper("quantum entanglement protocol", 0)];
        let summaries =
            summarize_clusters(&papers, &word_extractor(), &KeywordOptions::default()).unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(
            summaries[0].keywords,
            vec!["quantum", "entanglement", "protocol"]
        );
    }

    #[test]
    fn test_texts_joined_in_corpus_order() {
        let papers = vec![paper("a b", 1), paper("c", 0), paper("d", 1)];
        let texts = cluster_texts(&papers);

        assert_eq!(texts[&0], (1, "c".to_string()));
        assert_eq!(texts[&1], (2, "a b d".to_string()));
    }

    #[test]
    fn test_gaps_in_labels_tolerated() {
        let papers = vec![paper("x", 4), paper("y", 0)];
        let summaries =
            summarize_clusters(&papers, &word_extractor(), &KeywordOptions::default()).unwrap();

        let ids: Vec<_> = summaries.iter().map(|s| s.cluster_id).collect();
        assert_eq!(ids, vec![0, 4]);
        assert_eq!(summaries[1].keywords, vec!["x"]);
    }

    #[test]
    fn test_extractor_failure_names_cluster() {
        let failing = from_fn(|text: &str, _: &KeywordOptions| {
            if text.contains("bad") {
                Err("extractor crashed".into())
            } else {
                Ok(vec![])
            }
        });
        let papers = vec![paper("fine", 0), paper("bad text", 1)];

        let err = summarize_clusters(&papers, &failing, &KeywordOptions::default()).unwrap_err();
        assert_eq!(
            err,
            Error::KeywordFailure {
                cluster: 1,
                cause: "extractor crashed".into()
            }
        );
    }

    #[test]
    fn test_options_reach_extractor() {
        let echo = from_fn(|_: &str, o: &KeywordOptions| {
            Ok(vec![(format!("{}-{}", o.ngram_range.0, o.ngram_range.1), 1.0)])
        });
        let papers = vec![paper("x", 0)];

        let summaries = summarize_clusters(&papers, &echo, &KeywordOptions::default()).unwrap();
        assert_eq!(summaries[0].keywords, vec!["1-2"]);
    }

    #[test]
    fn test_english_stop_words_loaded() {
        let words = StopWords::English.words();
        assert!(words.contains("the"));
        assert!(words.contains("and"));
        assert!(!words.contains("quantum"));
    }
}
