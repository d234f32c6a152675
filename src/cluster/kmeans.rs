//! K-means clustering.
//!
//! Partitions data into k clusters by minimizing **within-cluster sum of squares**
//! (WCSS):
//!
//! ```text
//! WCSS = Σₖ Σᵢ∈Cₖ ||xᵢ - μₖ||²
//! ```
//!
//! # Lloyd's Algorithm
//!
//! 1. Initialize k centroids (k-means++)
//! 2. **Assign**: each point → nearest centroid
//! 3. **Update**: each centroid → mean of assigned points
//! 4. Repeat until no label changes or the iteration cap is hit
//!
//! Convergence is judged on labels alone, so scaling the data does not change
//! the result. On a stable exit every point's nearest final centroid is its
//! own label.
//!
//! Lloyd only finds a local optimum, and the result depends on the initial
//! centroids. Pass a seed when runs must be reproducible: every random choice
//! (initial picks and empty-cluster re-seeding) comes from one seeded RNG.
//!
//! ## K-means++ Initialization
//!
//! 1. First centroid uniformly at random
//! 2. Each next centroid with probability ∝ D(x)², the squared distance to
//!    the nearest centroid chosen so far
//!
//! Points already chosen have D(x)² = 0 and are never picked twice, so with
//! k = n distinct points every point seeds its own cluster.

use super::traits::Clustering;
use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::prelude::*;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// K-means clustering algorithm.
#[derive(Debug, Clone)]
pub struct Kmeans {
    /// Number of clusters.
    k: usize,
    /// Maximum iterations.
    max_iter: usize,
    /// Random seed.
    seed: Option<u64>,
}

/// Result of a k-means fit.
#[derive(Debug, Clone)]
pub struct KmeansFit {
    /// Cluster label per point, in `[0, k)`.
    pub labels: Vec<usize>,
    /// Final centroids (k × d).
    pub centroids: Array2<f32>,
    /// Within-cluster sum of squares at the final assignment.
    pub inertia: f32,
    /// Iterations run.
    pub n_iter: usize,
}

impl Kmeans {
    /// Create a new K-means clusterer.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: 300,
            seed: None,
        }
    }

    /// Set maximum iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Initialize centroids using k-means++.
    fn init_centroids(&self, data: &ArrayView2<'_, f32>, rng: &mut impl Rng) -> Array2<f32> {
        let n = data.nrows();
        let mut centroids = Array2::zeros((self.k, data.ncols()));

        let first = rng.random_range(0..n);
        centroids.row_mut(0).assign(&data.row(first));

        // Squared distance from each point to its nearest chosen centroid.
        let mut nearest: Vec<f32> = data
            .rows()
            .into_iter()
            .map(|p| squared_distance(&p, &centroids.row(0)))
            .collect();

        for i in 1..self.k {
            let total: f32 = nearest.iter().sum();
            let selected = if total > 0.0 {
                let threshold = rng.random::<f32>() * total;
                let mut cumsum = 0.0;
                let mut selected = None;
                let mut last_positive = 0;
                for (j, &d) in nearest.iter().enumerate() {
                    if d <= 0.0 {
                        continue;
                    }
                    last_positive = j;
                    cumsum += d;
                    if cumsum >= threshold {
                        selected = Some(j);
                        break;
                    }
                }
                // Rounding can leave cumsum just short of the threshold.
                selected.unwrap_or(last_positive)
            } else {
                rng.random_range(0..n)
            };

            centroids.row_mut(i).assign(&data.row(selected));
            for (j, p) in data.rows().into_iter().enumerate() {
                nearest[j] = nearest[j].min(squared_distance(&p, &centroids.row(i)));
            }
        }

        centroids
    }

    fn nearest_centroid(point: &ArrayView1<'_, f32>, centroids: &Array2<f32>) -> usize {
        let mut best_cluster = 0;
        let mut best_dist = f32::MAX;
        for (k, c) in centroids.rows().into_iter().enumerate() {
            let dist = squared_distance(point, &c);
            if dist < best_dist {
                best_dist = dist;
                best_cluster = k;
            }
        }
        best_cluster
    }

    /// Fit to an n × d matrix.
    pub fn fit(&self, data: ArrayView2<'_, f32>) -> Result<KmeansFit> {
        let n = data.nrows();
        let d = data.ncols();

        if n == 0 {
            return Err(Error::EmptyCorpus);
        }
        if self.k == 0 || self.k > n {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: n,
            });
        }

        let mut rng = match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        let mut centroids = self.init_centroids(&data, &mut rng);
        let mut labels = vec![usize::MAX; n];
        let mut n_iter = 0;

        while n_iter < self.max_iter {
            n_iter += 1;

            #[cfg(feature = "parallel")]
            let next: Vec<usize> = (0..n)
                .into_par_iter()
                .map(|i| Self::nearest_centroid(&data.row(i), &centroids))
                .collect();

            #[cfg(not(feature = "parallel"))]
            let next: Vec<usize> = data
                .rows()
                .into_iter()
                .map(|p| Self::nearest_centroid(&p, &centroids))
                .collect();

            let changed = next.iter().zip(&labels).filter(|(a, b)| a != b).count();
            labels = next;

            let mut new_centroids = Array2::<f32>::zeros((self.k, d));
            let mut counts = vec![0usize; self.k];
            for (i, &k) in labels.iter().enumerate() {
                let mut row = new_centroids.row_mut(k);
                row += &data.row(i);
                counts[k] += 1;
            }

            let mut reseeded = 0;
            for k in 0..self.k {
                if counts[k] > 0 {
                    new_centroids
                        .row_mut(k)
                        .mapv_inplace(|x| x / counts[k] as f32);
                } else {
                    let idx = rng.random_range(0..n);
                    tracing::warn!(cluster = k, point = idx, "empty cluster re-seeded");
                    new_centroids.row_mut(k).assign(&data.row(idx));
                    reseeded += 1;
                }
            }

            let shift: f32 = centroids
                .iter()
                .zip(new_centroids.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum();
            centroids = new_centroids;

            tracing::debug!(iter = n_iter, changed, reseeded, shift, "k-means iteration");

            // A re-seeded centroid has not been assigned any points yet.
            if changed == 0 && reseeded == 0 {
                break;
            }
        }

        let inertia = labels
            .iter()
            .enumerate()
            .map(|(i, &k)| squared_distance(&data.row(i), &centroids.row(k)))
            .sum();

        Ok(KmeansFit {
            labels,
            centroids,
            inertia,
            n_iter,
        })
    }
}

/// Squared Euclidean distance.
fn squared_distance(a: &ArrayView1<'_, f32>, b: &ArrayView1<'_, f32>) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

impl Clustering for Kmeans {
    fn fit_predict(&self, data: ArrayView2<'_, f32>) -> Result<Vec<usize>> {
        self.fit(data).map(|fit| fit.labels)
    }

    fn n_clusters(&self) -> usize {
        self.k
    }
}
