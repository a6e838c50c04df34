//! Backport title grammar.
//!
//! Backport pull requests are titled
//!
//! ```text
//! <word> <parent-ref> <word> <version>: <description...>
//! ```
//!
//! for example `Backport #1234 to v1.2: Fix null pointer on shutdown`.
//! The second whitespace-separated token names the original change and
//! the fourth, with surrounding colons trimmed, names the target branch.
//! Everything after the first colon is the feature description that
//! groups the backports of one change together. Titles that stray from
//! the layout (`Revert "Backport ..."`, several target versions) still
//! parse by token position; only a missing colon, fewer than four tokens
//! or an empty description are rejected.

use tracing::warn;

use crate::{
    error::{BackportError, ParseFailure},
    types::{Backport, BackportState, IssueRecord, IssueState, Repo},
};

/// Fields recovered from a title alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTitle {
    pub parent_version: String,
    pub version: String,
    pub description: String,
}

/// Splits a backport title into its parent reference, version and
/// description.
pub fn parse_title(title: &str) -> Result<ParsedTitle, ParseFailure> {
    let (_, description) = title
        .split_once(':')
        .ok_or(ParseFailure::MissingSeparator)?;

    let tokens: Vec<&str> = title.split_whitespace().collect();
    let [_, parent, _, version, ..] = tokens.as_slice() else {
        return Err(ParseFailure::TooFewTokens(tokens.len()));
    };

    let description = description.trim();
    if description.is_empty() {
        return Err(ParseFailure::EmptyDescription);
    }

    Ok(ParsedTitle {
        parent_version: parent.to_string(),
        version: version.trim_matches(':').to_string(),
        description: description.to_string(),
    })
}

/// Builds a [`Backport`] from a search hit.
///
/// `partition` is the state the owning query selected. A closed issue
/// takes that state so merged and unmerged backports stay apart; an open
/// issue is always `Open`.
pub fn parse_backport(
    issue: &IssueRecord,
    partition: BackportState,
) -> Result<Backport, BackportError> {
    let parsed = parse_title(&issue.title).map_err(|reason| {
        warn!(number = issue.number, title = %issue.title, %reason, "malformed backport title");
        BackportError::parse(&issue.title, reason)
    })?;

    let repo = Repo::from_api_url(&issue.repository_url).ok_or_else(|| {
        BackportError::parse(
            &issue.title,
            ParseFailure::UnknownRepository(issue.repository_url.to_string()),
        )
    })?;

    let state = match issue.state {
        IssueState::Open => BackportState::Open,
        IssueState::Closed => partition,
    };

    Ok(Backport {
        parent_url: repo.pull_url(&parsed.parent_version),
        parent_version: parsed.parent_version,
        version: parsed.version,
        version_title: issue.title.clone(),
        title: parsed.description,
        state,
        url: issue.html_url.to_string(),
        issue_number: issue.number,
        created_at: issue.created_at,
    })
}
