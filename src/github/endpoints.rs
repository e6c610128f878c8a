// GitHub API endpoint functions.
// Provides typed methods for fetching data from the GitHub REST API.

use reqwest::header::LINK;

use crate::error::{OrgtopError, Result};
use crate::rank::MetricsSource;

use super::client::GitHubClient;
use super::types::{RepoMetrics, Repository};

const PAGE_SIZE: u32 = 100;

impl GitHubClient {
    /// Get every repository of an organization.
    ///
    /// Pages through the listing until a short page, so the returned list is
    /// fully materialized.
    pub async fn get_all_org_repos(&mut self, org: &str) -> Result<Vec<Repository>> {
        let mut repos = Vec::new();
        let mut page: u32 = 1;

        loop {
            let params = [
                ("page", page.to_string()),
                ("per_page", PAGE_SIZE.to_string()),
            ];
            let response = self
                .get_with_params(&format!("/orgs/{}/repos", org), &params)
                .await?;
            let batch: Vec<Repository> = response.json().await?;
            let len = batch.len();
            repos.extend(batch);

            if len < PAGE_SIZE as usize {
                return Ok(repos);
            }
            page += 1;
        }
    }

    /// Get a specific repository.
    pub async fn get_repo(&mut self, owner: &str, repo: &str) -> Result<Repository> {
        let response = self.get(&format!("/repos/{}/{}", owner, repo)).await?;
        let repository: Repository = response.json().await?;
        Ok(repository)
    }

    /// Count a repository's open pull requests.
    ///
    /// Requests a single-item page and reads the last page number out of the
    /// Link header, which equals the total count at per_page=1. Without a
    /// Link header the body itself is the whole result set.
    pub async fn get_open_pull_request_count(&mut self, owner: &str, repo: &str) -> Result<u64> {
        let params = [("state", "open"), ("per_page", "1")];
        let response = self
            .get_with_params(&format!("/repos/{}/{}/pulls", owner, repo), &params)
            .await?;

        let last_page = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(last_page_number);

        match last_page {
            Some(count) => Ok(count),
            None => {
                let pulls: Vec<serde_json::Value> = response.json().await?;
                Ok(pulls.len() as u64)
            }
        }
    }
}

impl MetricsSource for GitHubClient {
    /// Fetch a fresh, wholesale metrics record for one repository.
    async fn fetch_metrics(&mut self, repo: &Repository) -> Result<RepoMetrics> {
        let (owner, name) = repo.full_name.split_once('/').ok_or_else(|| {
            OrgtopError::Other(format!("malformed repository name: {}", repo.full_name))
        })?;

        let fresh = self.get_repo(owner, name).await?;
        let pull_requests_count = self.get_open_pull_request_count(owner, name).await?;

        Ok(RepoMetrics {
            stars_count: fresh.stargazers_count,
            forks_count: fresh.forks_count,
            pull_requests_count,
        })
    }
}

/// Extract the page number of the rel="last" entry from a Link header.
fn last_page_number(link: &str) -> Option<u64> {
    link.split(',').find_map(|part| {
        let (url, params) = part.split_once(';')?;
        if !params.contains("rel=\"last\"") {
            return None;
        }
        let url = url.trim().trim_start_matches('<').trim_end_matches('>');
        url.split(['?', '&'])
            .find_map(|param| param.strip_prefix("page="))
            .and_then(|value| value.parse().ok())
    })
}
