// GitHub API module.
// HTTP client, typed endpoints, and response types for the REST API.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::GitHubClient;
pub use types::{RepoMetrics, Repository};
