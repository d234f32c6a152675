//! Topical grouping of papers.
//!
//! Papers are grouped by running K-means over their abstract embeddings:
//! assign each point to the nearest centroid, then move each centroid to the
//! mean of its points, and repeat. The objective is the within-cluster sum
//! of squares:
//!
//! ```text
//! J = Σ_k Σ_{x ∈ C_k} ||x - μ_k||²
//! ```
//!
//! K-means assumes roughly spherical, similarly sized groups and a known k.
//! For abstract embeddings those assumptions are loose, but the labels are
//! only used to pick which abstracts get summarized together.
//!
//! ## Usage
//!
//! ```rust
//! use ndarray::array;
//! use papermap::cluster::{Clustering, Kmeans};
//!
//! let data = array![[0.0, 0.0], [0.1, 0.1], [10.0, 10.0], [10.1, 10.1]];
//!
//! let labels = Kmeans::new(2).with_seed(42).fit_predict(data.view()).unwrap();
//! assert_eq!(labels[0], labels[1]);
//! assert_ne!(labels[0], labels[2]);
//! ```

mod kmeans;
mod traits;

pub use kmeans::{Kmeans, KmeansFit};
pub use traits::Clustering;

use crate::corpus::{EmbeddedPaper, Paper};
use crate::embed::embedding_matrix;
use crate::error::{Error, Result};

/// Label every paper with `clusterer`, rebuilding each as a [`Paper`].
///
/// Checks the requested cluster count against the corpus size before the
/// clusterer runs.
pub fn cluster_papers<C: Clustering>(
    papers: Vec<EmbeddedPaper>,
    clusterer: &C,
) -> Result<Vec<Paper>> {
    if papers.is_empty() {
        return Err(Error::EmptyCorpus);
    }
    check_cluster_count(clusterer.n_clusters(), papers.len())?;

    let matrix = embedding_matrix(&papers)?;
    let labels = clusterer.fit_predict(matrix.view())?;

    tracing::info!(
        papers = papers.len(),
        clusters = clusterer.n_clusters(),
        "papers clustered"
    );

    Ok(papers
        .into_iter()
        .zip(labels)
        .map(|(paper, label)| paper.with_cluster(label))
        .collect())
}

/// Fail with [`Error::InvalidClusterCount`] unless `1 <= k <= n_items`.
pub fn check_cluster_count(k: usize, n_items: usize) -> Result<()> {
    if k == 0 || k > n_items {
        return Err(Error::InvalidClusterCount {
            requested: k,
            n_items,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::PaperRecord;

    fn embedded(points: &[[f32; 2]]) -> Vec<EmbeddedPaper> {
        points
            .iter()
            .enumerate()
            .map(|(i, p)| PaperRecord::new(format!("paper {i}"), vec![]).with_embedding(p.to_vec()))
            .collect()
    }

    #[test]
    fn test_cluster_papers_keeps_order() {
        let papers = embedded(&[[0.0, 0.0], [9.0, 9.0], [0.2, 0.1], [9.1, 8.9]]);

        let clustered = cluster_papers(papers, &Kmeans::new(2).with_seed(42)).unwrap();

        assert_eq!(clustered.len(), 4);
        for (i, p) in clustered.iter().enumerate() {
            assert_eq!(p.abstract_text, format!("paper {i}"));
        }
        assert_eq!(clustered[0].cluster, clustered[2].cluster);
        assert_eq!(clustered[1].cluster, clustered[3].cluster);
        assert_ne!(clustered[0].cluster, clustered[1].cluster);
    }

    #[test]
    fn test_cluster_count_rejected_upfront() {
        let papers = embedded(&[[0.0, 0.0], [1.0, 1.0]]);
        let err = cluster_papers(papers, &Kmeans::new(6)).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidClusterCount {
                requested: 6,
                n_items: 2
            }
        );
    }

    #[test]
    fn test_check_cluster_count_bounds() {
        assert!(check_cluster_count(1, 1).is_ok());
        assert!(check_cluster_count(3, 3).is_ok());
        assert!(check_cluster_count(0, 3).is_err());
        assert!(check_cluster_count(4, 3).is_err());
    }
}
