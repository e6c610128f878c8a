// GitHub API response types.
// Defines structs for deserializing GitHub REST API responses.

use serde::{Deserialize, Serialize};

/// GitHub repository, as returned by the org repos listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
}

/// Raw counts backing every ranking metric for one repository.
/// Immutable once built; a refresh replaces the whole record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoMetrics {
    pub stars_count: u64,
    pub forks_count: u64,
    pub pull_requests_count: u64,
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}

#[cfg(test)]
pub(crate) fn test_repository(org: &str, name: &str) -> Repository {
    Repository {
        id: 0,
        name: name.to_string(),
        full_name: format!("{}/{}", org, name),
        description: None,
        stargazers_count: 0,
        forks_count: 0,
    }
}
