//! K-means over padded feature vectors, seeded with k-means++.
//!
//! Distances are plain Euclidean over raw occurrence counts. Generic container
//! tags that appear hundreds of times per page therefore dominate the metric;
//! corpora with very unbalanced tag frequencies cluster mostly on those tags.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use replayscope_backdrop_corpus::Corpus;

use crate::distance::{euclidean_distance, squared_distance};
use crate::errors::{ClusterError, ClusterResult};
use crate::policy::KMeansPolicy;

/// Non-empty clusters in centroid order; each holds ascending corpus indices.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub clusters: Vec<Vec<usize>>,
    pub iterations: usize,
    pub converged: bool,
    pub inertia: f64,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Cluster position holding corpus index `member`.
    pub fn cluster_of(&self, member: usize) -> Option<usize> {
        self.clusters
            .iter()
            .position(|members| members.binary_search(&member).is_ok())
    }
}

#[derive(Clone, Debug, Default)]
pub struct KMeansEngine {
    policy: KMeansPolicy,
}

impl KMeansEngine {
    pub fn new(policy: KMeansPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &KMeansPolicy {
        &self.policy
    }

    pub fn cluster<R>(&self, corpus: &Corpus, rng: &mut R) -> ClusterResult<Partition>
    where
        R: Rng + ?Sized,
    {
        self.cluster_vectors(&corpus.vectors(), rng)
    }

    /// Partitions `vectors` into at most `policy.clusters` groups.
    ///
    /// Every vector must have the same length; a mismatch means padding was
    /// skipped and fails the run.
    pub fn cluster_vectors<R>(&self, vectors: &[&[u32]], rng: &mut R) -> ClusterResult<Partition>
    where
        R: Rng + ?Sized,
    {
        self.policy.validate()?;
        let Some(first) = vectors.first() else {
            return Ok(Partition::default());
        };
        let dimension = first.len();
        if let Some((index, found)) = vectors
            .iter()
            .map(|v| v.len())
            .enumerate()
            .find(|(_, len)| *len != dimension)
        {
            return Err(ClusterError::DimensionMismatch {
                index,
                expected: dimension,
                found,
            });
        }

        let points: Vec<Vec<f64>> = vectors
            .iter()
            .map(|v| v.iter().map(|&count| f64::from(count)).collect())
            .collect();
        let mut centroids = seed_centroids(&points, self.policy.clusters, rng);
        debug!(
            requested = self.policy.clusters,
            seeded = centroids.len(),
            points = points.len(),
            dimension,
            "seeded centroids"
        );

        let mut current: Vec<usize> = Vec::new();
        let mut best: Option<(Vec<usize>, f64)> = None;
        let mut iterations = 0;
        let mut converged = false;
        while iterations < self.policy.max_iterations {
            iterations += 1;
            let (next, inertia) = assign(&points, &centroids);
            let changed = next != current;
            current = next;
            if best.as_ref().map_or(true, |(_, lowest)| inertia < *lowest) {
                best = Some((current.clone(), inertia));
            }
            if !changed {
                converged = true;
                break;
            }
            centroids = update_centroids(&points, &current, &centroids);
        }

        let Some((assignments, inertia)) = best else {
            return Err(ClusterError::InvalidArg("max_iterations must be > 0".into()));
        };
        let mut clusters = vec![Vec::new(); centroids.len()];
        for (point, &cluster) in assignments.iter().enumerate() {
            clusters[cluster].push(point);
        }
        clusters.retain(|members| !members.is_empty());

        info!(
            clusters = clusters.len(),
            iterations,
            converged,
            inertia,
            "k-means finished"
        );
        Ok(Partition {
            clusters,
            iterations,
            converged,
            inertia,
        })
    }
}

/// k-means++ seeding. Stops early once every point coincides with a chosen
/// centroid, so fewer distinct points than `k` yield fewer centroids.
pub fn seed_centroids<R>(points: &[Vec<f64>], k: usize, rng: &mut R) -> Vec<Vec<f64>>
where
    R: Rng + ?Sized,
{
    if points.is_empty() || k == 0 {
        return Vec::new();
    }
    let first = rng.gen_range(0..points.len());
    let mut centroids = vec![points[first].clone()];
    let mut nearest: Vec<f64> = points
        .iter()
        .map(|p| squared_distance(p, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = nearest.iter().sum();
        if total <= 0.0 {
            break;
        }
        let target = rng.gen::<f64>() * total;
        let chosen = points[pick_weighted(&nearest, target)].clone();
        for (dist, point) in nearest.iter_mut().zip(points) {
            *dist = dist.min(squared_distance(point, &chosen));
        }
        centroids.push(chosen);
    }
    centroids
}

/// First index whose cumulative weight exceeds `target`, skipping zero weights.
fn pick_weighted(weights: &[f64], target: f64) -> usize {
    let mut cumulative = 0.0;
    let mut last_positive = 0;
    for (index, &weight) in weights.iter().enumerate() {
        if weight <= 0.0 {
            continue;
        }
        last_positive = index;
        cumulative += weight;
        if target < cumulative {
            return index;
        }
    }
    last_positive
}

/// Nearest centroid per point (ties go to the lower index) and the total
/// squared distance.
fn assign(points: &[Vec<f64>], centroids: &[Vec<f64>]) -> (Vec<usize>, f64) {
    let mut inertia = 0.0;
    let assignments = points
        .iter()
        .map(|point| {
            let mut best = 0;
            let mut best_dist = f64::INFINITY;
            for (index, centroid) in centroids.iter().enumerate() {
                let dist = euclidean_distance(point, centroid);
                if dist < best_dist {
                    best = index;
                    best_dist = dist;
                }
            }
            inertia += best_dist * best_dist;
            best
        })
        .collect();
    (assignments, inertia)
}

/// Coordinate-wise mean per cluster; clusters without members keep their
/// previous centroid.
fn update_centroids(
    points: &[Vec<f64>],
    assignments: &[usize],
    previous: &[Vec<f64>],
) -> Vec<Vec<f64>> {
    let dimension = previous.first().map(Vec::len).unwrap_or(0);
    let mut sums = vec![vec![0.0; dimension]; previous.len()];
    let mut counts = vec![0usize; previous.len()];
    for (point, &cluster) in points.iter().zip(assignments) {
        counts[cluster] += 1;
        for (sum, value) in sums[cluster].iter_mut().zip(point) {
            *sum += value;
        }
    }
    sums.into_iter()
        .zip(counts)
        .zip(previous)
        .map(|((mut sum, count), old)| {
            if count == 0 {
                return old.clone();
            }
            for value in sum.iter_mut() {
                *value /= count as f64;
            }
            sum
        })
        .collect()
}
