//! # papermap
//!
//! Topical structure and author similarity for a corpus of paper abstracts.
//!
//! One embedding per abstract feeds three analyses:
//!
//! - **clusters**: k-means groups of papers ([`cluster`])
//! - **keywords**: ranked phrases per group ([`summarize`])
//! - **author peers**: nearest authors by centroid distance ([`authors`])
//!
//! The embedding model and keyword extractor are injected (see
//! [`EmbeddingProvider`] and [`KeywordExtractor`]), so a run can use a local
//! sentence-transformer (`fastembed` feature), the built-in
//! [`LexicalEmbedder`], or a test stub.
//!
//! ```rust
//! use papermap::{
//!     Corpus, EmbeddingKeywordExtractor, LexicalEmbedder, PaperRecord, Pipeline, PipelineConfig,
//! };
//!
//! let corpus = Corpus::from_records(vec![
//!     PaperRecord::new("quantum key distribution", vec!["Ana".into(), "Bo".into()]),
//!     PaperRecord::new("quantum repeaters", vec!["Bo".into()]),
//!     PaperRecord::new("protein folding", vec!["Chen".into()]),
//! ]);
//!
//! let embedder = LexicalEmbedder::new();
//! let pipeline = Pipeline::new(embedder.clone(), EmbeddingKeywordExtractor::new(embedder))
//!     .with_config(PipelineConfig::new().with_n_clusters(2));
//!
//! let analysis = pipeline.run(corpus).unwrap();
//! assert_eq!(analysis.labels().len(), 3);
//! ```

pub mod authors;
pub mod cluster;
pub mod corpus;
pub mod embed;
/// Error types used across `papermap`.
pub mod error;
pub mod pipeline;
pub mod summarize;


pub use authors::{AuthorProfile, AuthorRecommendation, AuthorSimilarity, MAX_PEERS};
pub use cluster::{Clustering, Kmeans};
pub use corpus::{load_corpus, parse_corpus, Corpus, EmbeddedPaper, Paper, PaperRecord};
pub use embed::{embed_corpus, EmbeddingProvider, FnEmbedder, LexicalEmbedder, ProviderError};
pub use error::{Error, Result};
pub use pipeline::{Analysis, Pipeline, PipelineConfig};
pub use summarize::{
    ClusterSummary, EmbeddingKeywordExtractor, KeywordExtractor, KeywordOptions, StopWords,
};

#[cfg(feature = "fastembed")]
pub use embed::fastembed::FastEmbedProvider;
