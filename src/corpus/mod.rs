//! Paper records and the corpus they form.
//!
//! A paper moves through the pipeline as three distinct values, one per
//! stage, instead of one record that gains fields in place:
//!
//! ```text
//! PaperRecord ──embed──▶ EmbeddedPaper ──cluster──▶ Paper
//! (abstract, authors)    (+ embedding)             (+ cluster label)
//! ```
//!
//! Each stage consumes the previous stage's values and builds new ones, so a
//! `Paper` is only ever observed fully populated.

mod loader;

pub use loader::{load_corpus, parse_corpus, DataError};

use serde::Serialize;

/// A paper as produced by the loader: abstract text plus co-author names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaperRecord {
    /// Abstract text. Never empty inside a [`Corpus`].
    pub abstract_text: String,
    /// Co-author display names, in source order.
    pub co_authors: Vec<String>,
}

impl PaperRecord {
    /// Create a record.
    pub fn new(abstract_text: impl Into<String>, co_authors: Vec<String>) -> Self {
        Self {
            abstract_text: abstract_text.into(),
            co_authors,
        }
    }

    /// Attach an embedding, producing the next-stage value.
    pub fn with_embedding(self, embedding: Vec<f32>) -> EmbeddedPaper {
        EmbeddedPaper {
            abstract_text: self.abstract_text,
            co_authors: self.co_authors,
            embedding,
        }
    }
}

/// A paper with its abstract embedding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbeddedPaper {
    /// Abstract text.
    pub abstract_text: String,
    /// Co-author display names.
    pub co_authors: Vec<String>,
    /// Abstract embedding (length D, shared by every paper in a run).
    pub embedding: Vec<f32>,
}

impl EmbeddedPaper {
    /// Attach a cluster label, producing the final paper value.
    pub fn with_cluster(self, cluster: usize) -> Paper {
        Paper {
            abstract_text: self.abstract_text,
            co_authors: self.co_authors,
            embedding: self.embedding,
            cluster,
        }
    }
}

/// A fully analysed paper.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paper {
    /// Abstract text.
    pub abstract_text: String,
    /// Co-author display names.
    pub co_authors: Vec<String>,
    /// Abstract embedding.
    pub embedding: Vec<f32>,
    /// Cluster label in `[0, k)`.
    pub cluster: usize,
}

/// Ordered collection of paper records, in source order.
///
/// Records with a blank abstract are dropped on construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    records: Vec<PaperRecord>,
    skipped: usize,
}

impl Corpus {
    /// Build a corpus, dropping records whose abstract is blank.
    pub fn from_records(records: impl IntoIterator<Item = PaperRecord>) -> Self {
        let mut skipped = 0;
        let records = records
            .into_iter()
            .filter(|r| {
                let keep = !r.abstract_text.trim().is_empty();
                if !keep {
                    skipped += 1;
                }
                keep
            })
            .collect();
        Self { records, skipped }
    }

    pub(crate) fn with_skipped(mut self, skipped: usize) -> Self {
        self.skipped += skipped;
        self
    }

    /// Number of retained papers.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no papers were retained.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of source records dropped while building the corpus.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Retained records, in source order.
    pub fn records(&self) -> &[PaperRecord] {
        &self.records
    }

    /// Consume the corpus, yielding its records.
    pub fn into_records(self) -> Vec<PaperRecord> {
        self.records
    }
}

impl FromIterator<PaperRecord> for Corpus {
    fn from_iter<I: IntoIterator<Item = PaperRecord>>(iter: I) -> Self {
        Self::from_records(iter)
    }
}
