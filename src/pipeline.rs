//! End-to-end analysis run.
//!
//! ```text
//! Corpus ─▶ embed ─┬─▶ author similarity ─────────────▶ recommendations
//!                  └─▶ k-means ─▶ Paper (+label) ─▶ keyword summaries
//! ```
//!
//! Each stage consumes the whole output of the one before it. Any failure
//! aborts the run and no partial [`Analysis`] is returned.

use crate::authors::{AuthorRecommendation, AuthorSimilarity};
use crate::cluster::{check_cluster_count, cluster_papers, Kmeans};
use crate::corpus::{Corpus, Paper};
use crate::embed::{embed_corpus, embedding_matrix, EmbeddingProvider};
use crate::error::{Error, Result};
use crate::summarize::{summarize_clusters, ClusterSummary, KeywordExtractor, KeywordOptions};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Configuration for a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of topical clusters (k).
    pub n_clusters: usize,
    /// Seed for k-means initialization.
    pub seed: u64,
    /// K-means iteration cap.
    pub max_iter: usize,
    /// Options handed to the keyword extractor.
    pub keywords: KeywordOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            n_clusters: 6,
            seed: 42,
            max_iter: 300,
            keywords: KeywordOptions::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cluster count.
    pub fn with_n_clusters(mut self, k: usize) -> Self {
        self.n_clusters = k;
        self
    }

    /// Set the k-means seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the k-means iteration cap.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set keyword options.
    pub fn with_keywords(mut self, keywords: KeywordOptions) -> Self {
        self.keywords = keywords;
        self
    }

    fn kmeans(&self) -> Kmeans {
        Kmeans::new(self.n_clusters)
            .with_seed(self.seed)
            .with_max_iter(self.max_iter)
    }
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Papers in corpus order, with embedding and label.
    pub papers: Vec<Paper>,
    /// N × D embedding matrix, row `i` = paper `i`.
    pub embeddings: Array2<f32>,
    /// Author profiles and their distance matrix.
    pub authors: AuthorSimilarity,
    /// Peer recommendations, in author first-appearance order.
    pub recommendations: Vec<AuthorRecommendation>,
    /// Keyword summaries, ascending cluster id.
    pub summaries: Vec<ClusterSummary>,
}

impl Analysis {
    /// Cluster label per paper, in corpus order.
    pub fn labels(&self) -> Vec<usize> {
        self.papers.iter().map(|p| p.cluster).collect()
    }

    /// Author name → ranked peer names.
    pub fn recommendations_by_author(&self) -> HashMap<&str, &[String]> {
        self.recommendations
            .iter()
            .map(|r| (r.author.as_str(), r.ranked_peers.as_slice()))
            .collect()
    }

    /// Cluster id → keyword phrases.
    pub fn keywords_by_cluster(&self) -> BTreeMap<usize, &[String]> {
        self.summaries
            .iter()
            .map(|s| (s.cluster_id, s.keywords.as_slice()))
            .collect()
    }

    /// Serializable view for reporting.
    pub fn report(&self) -> AnalysisReport<'_> {
        AnalysisReport {
            papers: self.papers.len(),
            authors: self.recommendations.len(),
            labels: self.labels(),
            clusters: &self.summaries,
            recommendations: &self.recommendations,
        }
    }
}

/// JSON-friendly summary of an [`Analysis`] (embeddings omitted).
#[derive(Debug, Serialize)]
pub struct AnalysisReport<'a> {
    /// Paper count.
    pub papers: usize,
    /// Distinct author count.
    pub authors: usize,
    /// Cluster label per paper.
    pub labels: Vec<usize>,
    /// Per-cluster keywords.
    pub clusters: &'a [ClusterSummary],
    /// Per-author peers.
    pub recommendations: &'a [AuthorRecommendation],
}

/// The analysis pipeline, holding its models.
#[derive(Debug, Clone)]
pub struct Pipeline<E, K> {
    embedder: E,
    extractor: K,
    config: PipelineConfig,
}

impl<E: EmbeddingProvider, K: KeywordExtractor> Pipeline<E, K> {
    /// Create a pipeline with default configuration.
    pub fn new(embedder: E, extractor: K) -> Self {
        Self {
            embedder,
            extractor,
            config: PipelineConfig::default(),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage over `corpus`.
    pub fn run(&self, corpus: Corpus) -> Result<Analysis> {
        if corpus.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        check_cluster_count(self.config.n_clusters, corpus.len())?;

        let embedded = embed_corpus(corpus, &self.embedder)?;
        let embeddings = embedding_matrix(&embedded)?;

        let authors = AuthorSimilarity::from_papers(&embedded)?;
        let recommendations = authors.recommendations();

        let papers = cluster_papers(embedded, &self.config.kmeans())?;
        let summaries = summarize_clusters(&papers, &self.extractor, &self.config.keywords)?;

        tracing::info!(
            papers = papers.len(),
            authors = recommendations.len(),
            clusters = summaries.len(),
            "analysis complete"
        );

        Ok(Analysis {
            papers,
            embeddings,
            authors,
            recommendations,
            summaries,
        })
    }
}
