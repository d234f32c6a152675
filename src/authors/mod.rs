//! Author similarity from per-author centroid embeddings.
//!
//! # Aggregation
//!
//! Every paper contributes its embedding once per co-author it lists. An
//! author's profile is the elementwise mean of everything contributed to
//! them, so an author with a single paper sits exactly on that paper.
//! Profiles keep the order in which authors first appear in the corpus.
//!
//! # Ranking
//!
//! A dense A × A Euclidean distance matrix is built over the centroids
//! (symmetric, zero diagonal). For each author the other authors are sorted
//! by ascending distance with a stable sort, so ties keep profile order.
//! The author is then removed *by name*, not by row index, and the first
//! [`MAX_PEERS`] survivors are the recommendations.
//!
//! Distances are raw Euclidean on un-normalized means. Cosine distance would
//! weigh prolific and one-paper authors differently; this module keeps
//! Euclidean.
//!
//! # Scaling
//!
//! Building the matrix is O(A² · D) time and O(A²) memory. That is fine up
//! to a few thousand authors. There is no approximate index.

use crate::corpus::{EmbeddedPaper, Paper};
use crate::error::{Error, Result};
use ndarray::Array2;
use serde::Serialize;
use std::collections::HashMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Number of peers recommended per author.
pub const MAX_PEERS: usize = 5;

/// Anything carrying co-authors and an embedding.
pub trait Authored {
    /// Co-author names.
    fn co_authors(&self) -> &[String];
    /// Paper embedding.
    fn embedding(&self) -> &[f32];
}

impl Authored for EmbeddedPaper {
    fn co_authors(&self) -> &[String] {
        &self.co_authors
    }

    fn embedding(&self) -> &[f32] {
        &self.embedding
    }
}

impl Authored for Paper {
    fn co_authors(&self) -> &[String] {
        &self.co_authors
    }

    fn embedding(&self) -> &[f32] {
        &self.embedding
    }
}

/// One author's aggregate position in embedding space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorProfile {
    /// Author display name.
    pub name: String,
    /// Mean of the embeddings of every paper listing this author.
    pub centroid: Vec<f32>,
    /// Number of contributions (paper listings) averaged.
    pub paper_count: usize,
}

/// Nearest other authors for one author.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorRecommendation {
    /// The author.
    pub author: String,
    /// Up to [`MAX_PEERS`] other authors, closest first.
    pub ranked_peers: Vec<String>,
}

/// Build one profile per distinct author name, in first-appearance order.
pub fn aggregate_authors<P: Authored>(papers: &[P]) -> Result<Vec<AuthorProfile>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut acc: Vec<(&str, Vec<f64>, usize)> = Vec::new();
    let mut dim = None;

    for paper in papers {
        let embedding = paper.embedding();
        let expected = *dim.get_or_insert(embedding.len());
        if embedding.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                found: embedding.len(),
            });
        }

        for name in paper.co_authors() {
            let slot = *index.entry(name.as_str()).or_insert_with(|| {
                acc.push((name.as_str(), vec![0.0; expected], 0));
                acc.len() - 1
            });
            let (_, sum, count) = &mut acc[slot];
            for (s, &x) in sum.iter_mut().zip(embedding) {
                *s += f64::from(x);
            }
            *count += 1;
        }
    }

    Ok(acc
        .into_iter()
        .map(|(name, sum, count)| AuthorProfile {
            name: name.to_string(),
            centroid: sum.into_iter().map(|s| (s / count as f64) as f32).collect(),
            paper_count: count,
        })
        .collect())
}

fn euclidean(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = f64::from(x) - f64::from(y);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Author profiles with their pairwise distance matrix.
#[derive(Debug, Clone)]
pub struct AuthorSimilarity {
    profiles: Vec<AuthorProfile>,
    distances: Array2<f64>,
}

impl AuthorSimilarity {
    /// Aggregate profiles from papers and build the distance matrix.
    pub fn from_papers<P: Authored>(papers: &[P]) -> Result<Self> {
        Self::from_profiles(aggregate_authors(papers)?)
    }

    /// Build the distance matrix over existing profiles.
    ///
    /// Profiles may repeat a name; such entries never recommend each other.
    pub fn from_profiles(profiles: Vec<AuthorProfile>) -> Result<Self> {
        if let Some(first) = profiles.first() {
            let dim = first.centroid.len();
            if let Some(p) = profiles.iter().find(|p| p.centroid.len() != dim) {
                return Err(Error::DimensionMismatch {
                    expected: dim,
                    found: p.centroid.len(),
                });
            }
        }

        let a = profiles.len();
        let row = |i: usize| -> Vec<f64> {
            profiles
                .iter()
                .map(|other| euclidean(&profiles[i].centroid, &other.centroid))
                .collect()
        };

        #[cfg(feature = "parallel")]
        let rows: Vec<Vec<f64>> = (0..a).into_par_iter().map(row).collect();

        #[cfg(not(feature = "parallel"))]
        let rows: Vec<Vec<f64>> = (0..a).map(row).collect();

        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let distances = Array2::from_shape_vec((a, a), flat).map_err(|_| Error::InvalidParameter {
            name: "profiles",
            message: "distance rows do not form a square matrix",
        })?;

        tracing::info!(authors = a, "author distance matrix built");
        Ok(Self {
            profiles,
            distances,
        })
    }

    /// Profiles, in first-appearance order.
    pub fn profiles(&self) -> &[AuthorProfile] {
        &self.profiles
    }

    /// A × A Euclidean distance matrix, rows in profile order.
    pub fn distances(&self) -> &Array2<f64> {
        &self.distances
    }

    /// Closest other authors to profile `i`, with distances, at most [`MAX_PEERS`].
    pub fn ranked_peers(&self, i: usize) -> Vec<(&str, f64)> {
        let Some(me) = self.profiles.get(i) else {
            return Vec::new();
        };
        let row = self.distances.row(i);

        let mut order: Vec<usize> = (0..self.profiles.len()).collect();
        order.sort_by(|&a, &b| row[a].total_cmp(&row[b]));

        order
            .into_iter()
            .filter(|&j| self.profiles[j].name != me.name)
            .take(MAX_PEERS)
            .map(|j| (self.profiles[j].name.as_str(), row[j]))
            .collect()
    }

    /// Recommendations for every author, in profile order.
    pub fn recommendations(&self) -> Vec<AuthorRecommendation> {
        (0..self.profiles.len())
            .map(|i| AuthorRecommendation {
                author: self.profiles[i].name.clone(),
                ranked_peers: self
                    .ranked_peers(i)
                    .into_iter()
                    .map(|(name, _)| name.to_string())
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::PaperRecord;
    use proptest::prelude::*;

    fn paper(embedding: &[f32], authors: &[&str]) -> EmbeddedPaper {
        PaperRecord::new("x", authors.iter().map(|a| a.to_string()).collect())
            .with_embedding(embedding.to_vec())
    }

    fn profile(name: &str, centroid: &[f32]) -> AuthorProfile {
        AuthorProfile {
            name: name.into(),
            centroid: centroid.to_vec(),
            paper_count: 1,
        }
    }

    #[test]
    fn test_three_paper_centroids() {
        let papers = vec![
            paper(&[1.0, 0.0], &["A", "B"]),
            paper(&[0.0, 1.0], &["B", "C"]),
            paper(&[1.0, 1.0], &["A", "C"]),
        ];

        let profiles = aggregate_authors(&papers).unwrap();
        let names: Vec<_> = profiles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);

        assert_eq!(profiles[0].centroid, vec![1.0, 0.5]);
        assert_eq!(profiles[1].centroid, vec![0.5, 0.5]);
        assert_eq!(profiles[2].centroid, vec![0.5, 1.0]);
        assert!(profiles.iter().all(|p| p.paper_count == 2));

        let sim = AuthorSimilarity::from_profiles(profiles).unwrap();
        let d = sim.distances();
        assert!((d[[0, 1]] - 0.5).abs() < 1e-12);
        assert!((d[[0, 2]] - 0.5f64.sqrt()).abs() < 1e-12);
        assert!(d[[0, 1]] < d[[0, 2]]);

        let recs = sim.recommendations();
        assert_eq!(recs[0].ranked_peers, vec!["B", "C"]);
        // B is equidistant (0.5) from A and C; A comes first in author order.
        assert_eq!(recs[1].ranked_peers, vec!["A", "C"]);
        assert_eq!(recs[2].ranked_peers, vec!["B", "A"]);
    }

    #[test]
    fn test_single_paper_author_centroid_exact() {
        let e = [0.123_456_7f32, -3.5, 1e-7, 42.0];
        let papers = vec![paper(&e, &["Solo"]), paper(&[9.0, 9.0, 9.0, 9.0], &["Other"])];

        let profiles = aggregate_authors(&papers).unwrap();
        assert_eq!(profiles[0].centroid, e.to_vec());
    }

    #[test]
    fn test_distance_matrix_symmetric_zero_diagonal() {
        let papers = vec![
            paper(&[0.3, 0.1, 0.7], &["A", "B"]),
            paper(&[0.9, 0.2, 0.0], &["C"]),
            paper(&[0.4, 0.4, 0.4], &["B", "D"]),
        ];
        let sim = AuthorSimilarity::from_papers(&papers).unwrap();
        let d = sim.distances();

        for i in 0..4 {
            assert_eq!(d[[i, i]], 0.0);
            for j in 0..4 {
                assert_eq!(d[[i, j]], d[[j, i]]);
            }
        }
    }

    #[test]
    fn test_lone_author_has_no_peers() {
        let sim = AuthorSimilarity::from_papers(&[paper(&[1.0], &["Only"])]).unwrap();
        let recs = sim.recommendations();
        assert_eq!(recs.len(), 1);
        assert!(recs[0].ranked_peers.is_empty());
    }

    #[test]
    fn test_peers_truncated_to_five() {
        let papers: Vec<_> = (0..9)
            .map(|i| {
                let name = format!("author{i}");
                paper(&[i as f32], &[name.as_str()])
            })
            .collect();
        let sim = AuthorSimilarity::from_papers(&papers).unwrap();

        let peers = sim.ranked_peers(0);
        let names: Vec<_> = peers.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["author1", "author2", "author3", "author4", "author5"]);
    }

    #[test]
    fn test_duplicate_name_excluded() {
        // Two entries named "A": the second is at distance 0 but must not be recommended.
        let sim = AuthorSimilarity::from_profiles(vec![
            profile("A", &[0.0, 0.0]),
            profile("B", &[3.0, 4.0]),
            profile("A", &[0.0, 0.0]),
        ])
        .unwrap();

        let peers = sim.ranked_peers(0);
        assert_eq!(peers, vec![("B", 5.0)]);
        assert_eq!(sim.ranked_peers(2), vec![("B", 5.0)]);
    }

    #[test]
    fn test_author_listed_twice_on_one_paper() {
        let papers = vec![
            paper(&[2.0, 0.0], &["A", "A"]),
            paper(&[0.0, 2.0], &["A"]),
        ];
        let profiles = aggregate_authors(&papers).unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].paper_count, 3);
        let expected = [4.0f32 / 3.0, 2.0 / 3.0];
        for (got, want) in profiles[0].centroid.iter().zip(expected) {
            assert!((got - want).abs() < 1e-6);
        }
    }

    #[test]
    fn test_mismatched_embeddings_rejected() {
        let papers = vec![paper(&[1.0, 0.0], &["A"]), paper(&[1.0], &["B"])];
        assert_eq!(
            aggregate_authors(&papers).unwrap_err(),
            Error::DimensionMismatch {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_papers_without_authors_give_no_profiles() {
        let sim = AuthorSimilarity::from_papers(&[paper(&[1.0, 2.0], &[])]).unwrap();
        assert!(sim.profiles().is_empty());
        assert!(sim.recommendations().is_empty());
    }

    fn corpus_strategy() -> impl Strategy<Value = Vec<(Vec<f32>, Vec<usize>)>> {
        proptest::collection::vec(
            (
                proptest::collection::vec(-10.0f32..10.0, 3),
                proptest::collection::vec(0usize..12, 1..4),
            ),
            1..20,
        )
    }

    proptest! {
        #[test]
        fn ranked_peers_invariants(corpus in corpus_strategy()) {
            let papers: Vec<EmbeddedPaper> = corpus
                .iter()
                .map(|(e, authors)| {
                    let names: Vec<String> = authors.iter().map(|a| format!("author{a}")).collect();
                    PaperRecord::new("x", names).with_embedding(e.clone())
                })
                .collect();

            let sim = AuthorSimilarity::from_papers(&papers).unwrap();
            let n_authors = sim.profiles().len();

            for (i, p) in sim.profiles().iter().enumerate() {
                let peers = sim.ranked_peers(i);
                prop_assert_eq!(peers.len(), MAX_PEERS.min(n_authors - 1));
                prop_assert!(peers.iter().all(|(name, _)| *name != p.name));
                prop_assert!(peers.windows(2).all(|w| w[0].1 <= w[1].1));
            }
        }
    }
}
