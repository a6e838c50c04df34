use std::process::Command;

use anyhow::{Context, Result};
use async_trait::async_trait;
use octocrab::{Octocrab, models};
use tracing::{debug, warn};

use crate::{
    error::TransportError,
    search::SearchTransport,
    types::{IssueRecord, IssueState, SearchPage, SearchQuery},
};

/// Issue search over the GitHub REST API.
pub struct GitHub {
    client: Octocrab,
}

impl GitHub {
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Connects with the token found by [`get_github_token`].
    pub fn from_env() -> Result<Self> {
        setup_github_client().map(Self::new)
    }
}

#[async_trait]
impl SearchTransport for GitHub {
    async fn search(
        &self,
        query: &SearchQuery,
        page: u32,
        per_page: u8,
    ) -> Result<SearchPage, TransportError> {
        let results = self
            .client
            .search()
            .issues_and_pull_requests(&query.text)
            .sort("created")
            .order(query.order.as_str())
            .per_page(per_page)
            .page(page)
            .send()
            .await?;

        debug!(
            page,
            items = results.items.len(),
            total = ?results.total_count,
            "github search page"
        );

        Ok(SearchPage {
            next_page: results.next.is_some().then_some(page + 1),
            issues: results.items.into_iter().map(convert_issue).collect(),
        })
    }
}

fn convert_issue(issue: models::issues::Issue) -> IssueRecord {
    let state = match issue.state {
        models::IssueState::Open => IssueState::Open,
        _ => IssueState::Closed,
    };

    IssueRecord {
        number: issue.number,
        title: issue.title,
        state,
        html_url: issue.html_url,
        repository_url: issue.repository_url,
        created_at: issue.created_at,
    }
}

/// Keychain entry holding the token: service `GITHUB_TOKEN`, account `github`.
///
/// On macOS: `security add-generic-password -s GITHUB_TOKEN -a github -w`.
/// With a Secret Service keyring: `secret-tool store --label "GitHub token"
/// service GITHUB_TOKEN username github`.
const KEYCHAIN_SERVICE: &str = "GITHUB_TOKEN";
const KEYCHAIN_USER: &str = "github";

fn non_empty(token: String) -> Option<String> {
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Picks the first usable token: `GITHUB_TOKEN`, then `GH_TOKEN`, then the
/// OS keychain. `keychain` is only consulted when neither variable is set.
fn token_from_sources<E, K>(env: E, keychain: K) -> Option<String>
where
    E: Fn(&str) -> Option<String>,
    K: FnOnce() -> Option<String>,
{
    ["GITHUB_TOKEN", "GH_TOKEN"]
        .into_iter()
        .find_map(|var| env(var).and_then(non_empty))
        .or_else(|| keychain().and_then(non_empty))
}

fn keychain_token() -> Option<String> {
    let lookup = keyring::Entry::new(KEYCHAIN_SERVICE, KEYCHAIN_USER)
        .and_then(|entry| entry.get_password());

    match lookup {
        Ok(token) => Some(token),
        Err(keyring::Error::NoEntry) => {
            debug!("no GitHub token in the OS keychain");
            None
        }
        Err(e) => {
            warn!(error = %e, "could not read GitHub token from the OS keychain");
            None
        }
    }
}

pub fn get_github_token() -> Result<String> {
    // Prefer environment variables and the keychain over gh CLI to avoid
    // subprocess overhead.
    if let Some(token) = token_from_sources(|var| std::env::var(var).ok(), keychain_token) {
        return Ok(token);
    }

    let output = Command::new("gh")
        .args(["auth", "token"])
        .output()
        .context("No GITHUB_TOKEN, GH_TOKEN or keychain token, and the gh CLI could not be run")?;

    if !output.status.success() {
        anyhow::bail!("Failed to get GitHub token from gh CLI. Please run 'gh auth login' first");
    }

    let token = String::from_utf8(output.stdout)?.trim().to_string();

    if token.is_empty() {
        anyhow::bail!("Empty token returned from gh CLI");
    }

    Ok(token)
}

/// Creates an authenticated GitHub client using available credentials.
pub fn setup_github_client() -> Result<Octocrab> {
    let token = get_github_token().context("Failed to obtain GitHub authentication token")?;
    Octocrab::builder()
        .personal_token(token)
        .build()
        .context("Failed to create GitHub client")
}
