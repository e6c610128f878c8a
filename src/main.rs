// orgtop: rank a GitHub organization's repositories by a chosen metric.
// Parses arguments, wires the client and cache together, and prints the report.

mod cache;
mod error;
mod github;
mod metric;
mod rank;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cache::SnapshotCache;
use error::{OrgtopError, Result};
use github::{GitHubClient, Repository};
use metric::Metric;

/// For a given GitHub org, finds the top N repos by the requested metric.
#[derive(Debug, Parser)]
#[command(name = "orgtop")]
struct Args {
    /// The name of the org you want to explore
    org: String,

    /// How many repositories to report
    #[arg(short = 'n', long = "top-n", default_value_t = 5, value_parser = parse_top_n)]
    top_n: usize,

    /// The metric to rank repositories by
    #[arg(short = 'm', long = "metric", value_enum)]
    metric: Metric,

    /// Discard any cached data and re-fetch everything
    #[arg(long = "refresh-cache")]
    refresh_cache: bool,
}

fn parse_top_n(s: &str) -> std::result::Result<usize, String> {
    s.parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| "--top-n must be an integer value greater than zero".to_string())
}

/// One line of the final report.
struct ReportRow {
    repo: Repository,
    value: f64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let snapshot = cache::snapshot_path();
    let mut cache = match &snapshot {
        Some(path) => SnapshotCache::load(path, args.refresh_cache),
        None => SnapshotCache::new(),
    };
    if !cache.is_empty() {
        println!(
            "Note: Found cached data that will be used if not stale. \
             If you want to re-fetch all data, re-run this command with `--refresh-cache`.\n"
        );
    }

    let mut client = match GitHubClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{}", user_message(&e));
            std::process::exit(1);
        }
    };

    match run(&args, &mut cache, &mut client).await {
        Ok(rows) => {
            // The snapshot is persisted only after a successful run. A
            // propagated fetch failure skips the save, so a broken run
            // cannot overwrite the previous snapshot.
            if let Some(path) = &snapshot {
                if let Err(e) = cache.save(path) {
                    tracing::warn!(error = %e, "failed to persist cache snapshot");
                }
            }
            print_report(&args, &rows);
        }
        Err(e) => {
            eprintln!("{}", user_message(&e));
            std::process::exit(1);
        }
    }
}

/// Resolve the org's repositories, rank them, and pair each with its value.
async fn run(
    args: &Args,
    cache: &mut SnapshotCache,
    client: &mut GitHubClient,
) -> Result<Vec<ReportRow>> {
    let repos = match cache.repos_for_org(&args.org) {
        Some(repos) => repos,
        None => {
            let repos = client.get_all_org_repos(&args.org).await?;
            cache.put_repos_for_org(&args.org, repos.clone());
            repos
        }
    };

    let ranked = rank::select_top_n(&repos, args.top_n, args.metric, cache, client).await?;

    let rows = ranked
        .into_iter()
        .map(|repo| {
            // Selection just filled the cache, so this lookup cannot miss
            let value = cache
                .metrics_for_repo(&repo.full_name)
                .map(|metrics| args.metric.value_for(&metrics))
                .unwrap_or_default();
            ReportRow { repo, value }
        })
        .collect();

    Ok(rows)
}

fn print_report(args: &Args, rows: &[ReportRow]) {
    if rows.is_empty() {
        println!("No repositories found for {}.", args.org);
        return;
    }

    println!(
        "Top {} repos in {} by {}:",
        rows.len(),
        args.org,
        args.metric.label()
    );
    for (rank, row) in rows.iter().enumerate() {
        println!(
            "{:>3}. {} ({})",
            rank + 1,
            row.repo.name,
            args.metric.display_value(row.value)
        );
    }
}

/// Map an error to the message shown to the user.
fn user_message(error: &OrgtopError) -> String {
    match error {
        OrgtopError::Unauthorized => "ERROR: Bad credentials. Please confirm your access token \
             is entered correctly and that you have access to this organization."
            .to_string(),
        OrgtopError::RateLimited { reset_at } => format!(
            "ERROR: You've exceeded the GitHub API rate limits (resets at {}). \
             If you haven't set up a personal access token, doing so will increase \
             your allowed requests per hour.",
            reset_at
        ),
        OrgtopError::NotFound(_) => {
            "ERROR: The requested GitHub resource does not exist.".to_string()
        }
        other => format!("ERROR: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_top_n_accepts_positive_integers() {
        assert_eq!(parse_top_n("1"), Ok(1));
        assert_eq!(parse_top_n("25"), Ok(25));
    }

    #[test]
    fn test_parse_top_n_rejects_zero_and_garbage() {
        assert!(parse_top_n("0").is_err());
        assert!(parse_top_n("-3").is_err());
        assert!(parse_top_n("five").is_err());
        assert!(parse_top_n("").is_err());
    }

    #[test]
    fn test_user_message_for_not_found() {
        let message = user_message(&OrgtopError::NotFound("url".to_string()));
        assert!(message.contains("does not exist"));
    }
}
