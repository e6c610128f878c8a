// Ranking metrics.
// Maps a repository's raw counts to the numeric value used for ranking.

use clap::ValueEnum;

use crate::github::RepoMetrics;

/// Ranking criterion selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Metric {
    Stars,
    Forks,
    PullRequests,
    ContributionPercentage,
}

impl Metric {
    /// Numeric value of this metric for one repository.
    pub fn value_for(&self, metrics: &RepoMetrics) -> f64 {
        match self {
            Metric::Stars => metrics.stars_count as f64,
            Metric::Forks => metrics.forks_count as f64,
            Metric::PullRequests => metrics.pull_requests_count as f64,
            Metric::ContributionPercentage => {
                // The +1 in the denominator avoids dividing by zero for
                // fork-less repos and biases every value the same way, so
                // relative ordering is preserved.
                metrics.pull_requests_count as f64 / (metrics.forks_count as f64 + 1.0) * 100.0
            }
        }
    }

    /// Label used in the report header.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Stars => "stars",
            Metric::Forks => "forks",
            Metric::PullRequests => "pull requests",
            Metric::ContributionPercentage => "contribution percentage",
        }
    }

    /// Human-readable rendering of a metric value for the report.
    pub fn display_value(&self, value: f64) -> String {
        let count = value as u64;
        match self {
            Metric::Stars => format!("{} {}", count, pluralize("star", count)),
            Metric::Forks => format!("{} {}", count, pluralize("fork", count)),
            Metric::PullRequests => {
                format!("{} {}", count, pluralize("pull request", count))
            }
            Metric::ContributionPercentage => format!("{:.2}%", value),
        }
    }
}

fn pluralize(noun: &str, count: u64) -> String {
    if count == 1 {
        noun.to_string()
    } else {
        format!("{}s", noun)
    }
}
