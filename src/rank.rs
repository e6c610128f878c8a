// Top-N repository ranking.
// Bounded min-heap selection over cached metric values, with a
// deterministic tie-break on repository name.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use tracing::debug;

use crate::cache::SnapshotCache;
use crate::error::Result;
use crate::github::{RepoMetrics, Repository};
use crate::metric::Metric;

/// Anything that can produce a fresh metrics record for a repository.
/// The GitHub client implements this; tests use an in-memory fake.
pub trait MetricsSource {
    async fn fetch_metrics(&mut self, repo: &Repository) -> Result<RepoMetrics>;
}

/// One repository held in the selection heap.
///
/// Ordered by metric value, then by name, so that equal values rank the
/// lexicographically greater name higher. Rankings must come out identical
/// across runs, so this total order is part of the contract.
#[derive(Debug, Clone)]
struct RankedCandidate {
    value: f64,
    name: String,
    repo: Repository,
}

impl PartialEq for RankedCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankedCandidate {}

impl PartialOrd for RankedCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankedCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .total_cmp(&other.value)
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// Select the top `n` repositories by `metric`, ranked descending.
///
/// Metric values come from the cache when present; otherwise the source is
/// asked once per repository and the record is written back, so later runs
/// (and other metrics) reuse it. A fetch failure aborts the whole selection
/// and propagates to the caller.
pub async fn select_top_n<S: MetricsSource>(
    repos: &[Repository],
    n: usize,
    metric: Metric,
    cache: &mut SnapshotCache,
    source: &mut S,
) -> Result<Vec<Repository>> {
    if n == 0 {
        return Ok(Vec::new());
    }

    // Min-heap of capacity n: the root is the weakest candidate held.
    let mut heap: BinaryHeap<Reverse<RankedCandidate>> = BinaryHeap::with_capacity(n + 1);

    for repo in repos {
        let metrics = resolve_metrics(repo, cache, source).await?;
        let candidate = RankedCandidate {
            value: metric.value_for(&metrics),
            name: repo.name.clone(),
            repo: repo.clone(),
        };

        if heap.len() < n {
            heap.push(Reverse(candidate));
        } else if let Some(Reverse(weakest)) = heap.peek() {
            if candidate > *weakest {
                heap.pop();
                heap.push(Reverse(candidate));
            }
        }
    }

    // Ascending over Reverse is descending over the candidates
    Ok(heap
        .into_sorted_vec()
        .into_iter()
        .map(|Reverse(candidate)| candidate.repo)
        .collect())
}

/// Metrics for one repository: cache hit, or fetch-and-fill.
async fn resolve_metrics<S: MetricsSource>(
    repo: &Repository,
    cache: &mut SnapshotCache,
    source: &mut S,
) -> Result<RepoMetrics> {
    if let Some(metrics) = cache.metrics_for_repo(&repo.full_name) {
        debug!(repo = %repo.full_name, "metrics cache hit");
        return Ok(metrics);
    }

    debug!(repo = %repo.full_name, "metrics cache miss, fetching");
    let metrics = source.fetch_metrics(repo).await?;
    cache.put_repo_metrics(&repo.full_name, metrics);
    Ok(metrics)
}
