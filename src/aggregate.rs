use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::Config;
use crate::github::Api;
use crate::stats::{PullRequestRef, StatsSummary, calendar_date, format_date};

// TODO: query `sponsorshipsAsSponsor` over GraphQL; the REST API has no equivalent.
pub const SPONSORING_PLACEHOLDER: u64 = 0;

#[derive(Debug, Deserialize)]
pub struct Repo {
    pub name: String,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub private: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    total_count: u64,
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    created_at: String,
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct Profile {
    created_at: String,
    public_repos: u64,
    followers: u64,
}

#[derive(Clone, Copy)]
enum Order {
    Oldest,
    Newest,
}

pub fn repos_path(user: &str) -> String {
    format!("/users/{user}/repos?type=owner&per_page=100")
}

pub fn commits_path(user: &str, repo: &str) -> String {
    format!("/repos/{user}/{repo}/commits?author={user}&per_page=100")
}

pub fn profile_path(user: &str) -> String {
    format!("/users/{user}")
}

fn search_path(query: &str, order: Option<Order>) -> String {
    match order {
        Some(Order::Oldest) => {
            format!("/search/issues?q={query}&sort=created&order=asc&per_page=1")
        }
        Some(Order::Newest) => {
            format!("/search/issues?q={query}&sort=created&order=desc&per_page=1")
        }
        None => format!("/search/issues?q={query}&per_page=1"),
    }
}

/// Repositories that count towards stars and commits.
pub fn included_repos(repos: &[Repo], public_only: bool) -> impl Iterator<Item = &Repo> {
    repos.iter().filter(move |r| !(public_only && r.private))
}

pub fn total_stars(repos: &[Repo], public_only: bool) -> u64 {
    included_repos(repos, public_only)
        .map(|r| r.stargazers_count)
        .sum()
}

async fn fetch<A: Api, T: DeserializeOwned>(api: &A, path: &str) -> Result<T> {
    let json = api
        .get_json(path)
        .await
        .with_context(|| format!("Request to {path} failed"))?;
    serde_json::from_value(json).with_context(|| format!("Unexpected response shape from {path}"))
}

/// Head of a sorted pull request search, or `None` when nothing matched.
fn head_pull_request(result: &SearchResult) -> Result<Option<PullRequestRef>> {
    result
        .items
        .first()
        .map(|item| {
            Ok(PullRequestRef {
                created: calendar_date(&item.created_at)?,
                url: item.html_url.clone(),
            })
        })
        .transpose()
}

/// Commits by `user` on the first listed page of `repo` (at most 100).
async fn commit_count<A: Api>(api: &A, user: &str, repo: &str) -> Result<u64> {
    let path = commits_path(user, repo);
    match api.get_json(&path).await {
        Ok(json) => {
            let commits: Vec<Value> = serde_json::from_value(json)
                .with_context(|| format!("Unexpected response shape from {path}"))?;
            Ok(commits.len() as u64)
        }
        // GitHub's answer for a repository without any history.
        Err(e) if e.status() == Some(StatusCode::CONFLICT) => {
            debug!("{repo} has no commits yet");
            Ok(0)
        }
        Err(e) => Err(anyhow::Error::new(e).context(format!("Request to {path} failed"))),
    }
}

/// Run every query for `config.username` and fold the answers into one
/// summary. The first failed request aborts the whole aggregation.
pub async fn aggregate<A: Api>(
    api: &A,
    config: &Config,
    today: NaiveDate,
) -> Result<StatsSummary> {
    let user = config.username.as_str();

    let repos_url = repos_path(user);
    let issues_url = search_path(&format!("author:{user}+type:issue"), None);
    let oldest_pr_url = search_path(&format!("author:{user}+type:pr"), Some(Order::Oldest));
    let newest_pr_url = search_path(&format!("author:{user}+type:pr"), Some(Order::Newest));
    let merged_url = search_path(&format!("author:{user}+type:pr+is:merged"), None);
    let comments_url = search_path(&format!("commenter:{user}"), None);
    let profile_url = profile_path(user);

    let (repos, issues, oldest_prs, newest_prs, merged, comments, profile) = tokio::try_join!(
        fetch::<_, Vec<Repo>>(api, &repos_url),
        fetch::<_, SearchResult>(api, &issues_url),
        fetch::<_, SearchResult>(api, &oldest_pr_url),
        fetch::<_, SearchResult>(api, &newest_pr_url),
        fetch::<_, SearchResult>(api, &merged_url),
        fetch::<_, SearchResult>(api, &comments_url),
        fetch::<_, Profile>(api, &profile_url),
    )?;

    let mut commits = 0u64;
    for repo in included_repos(&repos, config.public_only) {
        commits = commits.saturating_add(commit_count(api, user, &repo.name).await?);
    }

    let (first_pr_date, first_pr_url) = head_pull_request(&oldest_prs)?
        .map(|pr| (pr.created, pr.url))
        .unzip();
    let (latest_pr_date, latest_pr_url) = head_pull_request(&newest_prs)?
        .map(|pr| (pr.created, pr.url))
        .unzip();
    let registered_at = calendar_date(&profile.created_at)
        .context("Profile carries an invalid registration date")?;

    let summary = StatsSummary {
        username: user.to_string(),
        issues: issues.total_count,
        pull_requests: oldest_prs.total_count,
        merged_pull_requests: merged.total_count,
        comments: comments.total_count,
        public_repos: profile.public_repos,
        stars: total_stars(&repos, config.public_only),
        commits,
        followers: profile.followers,
        sponsoring: SPONSORING_PLACEHOLDER,
        registered_at,
        first_pull_request_date: first_pr_date,
        first_pull_request_url: first_pr_url,
        latest_pull_request_date: latest_pr_date,
        latest_pull_request_url: latest_pr_url,
        stat_updated: format_date(today),
    };

    info!(
        stars = summary.stars,
        commits = summary.commits,
        pull_requests = summary.pull_requests,
        "Aggregated stats for {user}"
    );

    Ok(summary)
}
