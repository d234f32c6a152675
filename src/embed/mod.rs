//! Embedding providers and the embedding stage.
//!
//! The provider is an opaque `text → Vec<f32>` function with a fixed output
//! dimension. The stage applies it to every abstract of a corpus and keeps
//! the result aligned with corpus order: element `i` of the output always
//! belongs to paper `i`, whether or not the calls ran in parallel.
//!
//! Providers are passed in explicitly. Nothing here holds a process-wide
//! model, so tests can swap in a closure via [`FnEmbedder`].

#[cfg(feature = "fastembed")]
pub mod fastembed;
mod lexical;

pub use lexical::LexicalEmbedder;

use crate::corpus::{Corpus, EmbeddedPaper};
use crate::error::{Error, Result};
use ndarray::Array2;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Error type reported by external providers.
pub type ProviderError = Box<dyn std::error::Error + Send + Sync>;

/// A text embedding model.
///
/// Must be deterministic: the same text under the same model always yields
/// the same vector.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one piece of text.
    fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, ProviderError>;

    /// Output dimension D.
    fn dimension(&self) -> usize;

    /// Model identifier, for logs and reports.
    fn model_name(&self) -> &str {
        "custom"
    }
}

impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for &P {
    fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, ProviderError> {
        (**self).embed(text)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for Box<P> {
    fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, ProviderError> {
        (**self).embed(text)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// A closure-backed provider.
#[derive(Clone)]
pub struct FnEmbedder<F> {
    f: F,
    dim: usize,
}

impl<F> FnEmbedder<F>
where
    F: Fn(&str) -> std::result::Result<Vec<f32>, ProviderError> + Send + Sync,
{
    /// Wrap `f`, declaring that it returns vectors of length `dim`.
    pub fn new(dim: usize, f: F) -> Self {
        Self { f, dim }
    }
}

impl<F> EmbeddingProvider for FnEmbedder<F>
where
    F: Fn(&str) -> std::result::Result<Vec<f32>, ProviderError> + Send + Sync,
{
    fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, ProviderError> {
        (self.f)(text)
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn model_name(&self) -> &str {
        "fn"
    }
}

fn embed_one<P: EmbeddingProvider + ?Sized>(
    provider: &P,
    index: usize,
    text: &str,
) -> Result<Vec<f32>> {
    let vector = provider.embed(text).map_err(|e| Error::EmbeddingFailure {
        index,
        cause: e.to_string(),
    })?;

    let dim = provider.dimension();
    if vector.len() != dim {
        return Err(Error::EmbeddingFailure {
            index,
            cause: format!("expected {dim}-dimensional vector, got {}", vector.len()),
        });
    }
    Ok(vector)
}

/// Embed every abstract in `corpus`, in corpus order.
///
/// Fails with [`Error::EmptyCorpus`] before touching the provider if there is
/// nothing to embed, and with [`Error::EmbeddingFailure`] (first failing
/// index) if any single call fails. There is no partial result.
pub fn embed_corpus<P: EmbeddingProvider + ?Sized>(
    corpus: Corpus,
    provider: &P,
) -> Result<Vec<EmbeddedPaper>> {
    if corpus.is_empty() {
        return Err(Error::EmptyCorpus);
    }

    let records = corpus.into_records();
    tracing::info!(
        papers = records.len(),
        model = provider.model_name(),
        dim = provider.dimension(),
        "embedding abstracts"
    );

    // Gather every outcome first so the reported failure is the lowest index.
    #[cfg(feature = "parallel")]
    let vectors: Vec<Vec<f32>> = records
        .par_iter()
        .enumerate()
        .map(|(i, r)| embed_one(provider, i, &r.abstract_text))
        .collect::<Vec<_>>()
        .into_iter()
        .collect::<Result<_>>()?;

    #[cfg(not(feature = "parallel"))]
    let vectors: Vec<Vec<f32>> = records
        .iter()
        .enumerate()
        .map(|(i, r)| embed_one(provider, i, &r.abstract_text))
        .collect::<Result<_>>()?;

    Ok(records
        .into_iter()
        .zip(vectors)
        .map(|(record, embedding)| record.with_embedding(embedding))
        .collect())
}

/// Stack embeddings into an N×D matrix.
pub fn embedding_matrix(papers: &[EmbeddedPaper]) -> Result<Array2<f32>> {
    stack_rows(papers.iter().map(|p| p.embedding.as_slice()))
}

pub(crate) fn stack_rows<'a>(
    rows: impl ExactSizeIterator<Item = &'a [f32]>,
) -> Result<Array2<f32>> {
    let n = rows.len();
    let mut flat: Vec<f32> = Vec::new();
    let mut d = None;

    for row in rows {
        let expected = *d.get_or_insert(row.len());
        if row.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                found: row.len(),
            });
        }
        flat.extend_from_slice(row);
    }

    Array2::from_shape_vec((n, d.unwrap_or(0)), flat).map_err(|_| Error::InvalidParameter {
        name: "embeddings",
        message: "rows do not form a matrix",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::PaperRecord;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn corpus(texts: &[&str]) -> Corpus {
        texts
            .iter()
            .map(|t| PaperRecord::new(*t, vec![]))
            .collect()
    }

    fn length_embedder(
    ) -> FnEmbedder<impl Fn(&str) -> std::result::Result<Vec<f32>, ProviderError> + Send + Sync>
    {
        FnEmbedder::new(2, |t: &str| Ok(vec![t.len() as f32, 1.0]))
    }

    #[test]
    fn test_output_aligned_with_corpus() {
        let texts = ["a", "bbb", "cc", "dddd", "e"];
        let papers = embed_corpus(corpus(&texts), &length_embedder()).unwrap();

        assert_eq!(papers.len(), texts.len());
        for (paper, text) in papers.iter().zip(texts) {
            assert_eq!(paper.abstract_text, text);
            assert_eq!(paper.embedding, vec![text.len() as f32, 1.0]);
        }
    }

    #[test]
    fn test_empty_corpus_makes_no_calls() {
        let calls = AtomicUsize::new(0);
        let provider = FnEmbedder::new(2, |_: &str| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![0.0, 0.0])
        });

        let err = embed_corpus(Corpus::default(), &provider).unwrap_err();
        assert_eq!(err, Error::EmptyCorpus);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failure_reports_index() {
        let provider = FnEmbedder::new(1, |t: &str| {
            if t == "boom" {
                Err("model unavailable".into())
            } else {
                Ok(vec![1.0])
            }
        });

        let err = embed_corpus(corpus(&["ok", "ok", "boom", "ok"]), &provider).unwrap_err();
        assert_eq!(
            err,
            Error::EmbeddingFailure {
                index: 2,
                cause: "model unavailable".into()
            }
        );
    }

    #[test]
    fn test_wrong_length_is_failure() {
        let provider = FnEmbedder::new(3, |t: &str| Ok(vec![0.0; t.len()]));
        let err = embed_corpus(corpus(&["abc", "abcd"]), &provider).unwrap_err();
        assert!(matches!(err, Error::EmbeddingFailure { index: 1, .. }));
    }

    #[test]
    fn test_embedding_matrix_shape() {
        let papers = embed_corpus(corpus(&["a", "bb", "ccc"]), &length_embedder()).unwrap();
        let m = embedding_matrix(&papers).unwrap();

        assert_eq!(m.dim(), (3, 2));
        assert_eq!(m[[2, 0]], 3.0);
    }
}
