//! Per-run counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::info;

/// Counters updated concurrently while sessions load.
#[derive(Debug, Default)]
pub struct LoadCounters {
    loaded: AtomicU64,
    failed: AtomicU64,
}

impl LoadCounters {
    pub fn record_loaded(&self) {
        self.loaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn loaded(&self) -> u64 {
        self.loaded.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Sessions reported by the source.
    pub listed: usize,
    /// Sessions kept after the sample-rate draw and the cap.
    pub sampled: usize,
    pub loaded: usize,
    pub failed: usize,
    pub sessions_without_url: usize,
    pub backdrops: usize,
    pub dimension: usize,
    pub clusters: usize,
    pub iterations: usize,
    pub converged: bool,
    pub inertia: f64,
    pub elapsed_ms: u64,
}

impl RunStats {
    pub fn log(&self) {
        info!(
            listed = self.listed,
            sampled = self.sampled,
            loaded = self.loaded,
            failed = self.failed,
            without_url = self.sessions_without_url,
            backdrops = self.backdrops,
            dimension = self.dimension,
            clusters = self.clusters,
            iterations = self.iterations,
            converged = self.converged,
            elapsed_ms = self.elapsed_ms,
            "run finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let counters = LoadCounters::default();
        counters.record_loaded();
        counters.record_loaded();
        counters.record_failed();
        assert_eq!(counters.loaded(), 2);
        assert_eq!(counters.failed(), 1);
    }
}
