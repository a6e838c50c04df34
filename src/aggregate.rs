//! Listing operations built from partitioned backport searches.

use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::{
    error::BackportError,
    query::{grouped_query, stale_query},
    search::{SearchTransport, fetch_all},
    title::parse_backport,
    types::{Backport, BackportGroup, BackportState, ListOpts, SearchQuery},
};

/// Backport listings for a team, served through an injected transport.
pub struct Backports<T> {
    transport: T,
}

impl<T> Backports<T>
where
    T: SearchTransport + Sync,
{
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// See [`list_grouped_backports`].
    pub async fn list_grouped_backports(
        &self,
        org: &str,
        team: &str,
        opts: &ListOpts,
    ) -> Result<BackportGroup, BackportError> {
        list_grouped_backports(&self.transport, org, team, opts).await
    }

    /// See [`list_stale`].
    pub async fn list_stale(
        &self,
        org: &str,
        team: &str,
        opts: &ListOpts,
    ) -> Result<Vec<Backport>, BackportError> {
        list_stale(&self.transport, org, team, opts).await
    }
}

/// Groups a team's backports by the feature they port.
///
/// Open, merged and closed-unmerged backports are searched one after the
/// other and appended per title in that order. Any failing search or
/// malformed title fails the whole listing.
pub async fn list_grouped_backports<T>(
    transport: &T,
    org: &str,
    team: &str,
    opts: &ListOpts,
) -> Result<BackportGroup, BackportError>
where
    T: SearchTransport + Sync + ?Sized,
{
    grouped_backports_as_of(transport, org, team, opts, today()).await
}

/// Lists open backports created at least `opts.older_than` days ago,
/// newest first.
pub async fn list_stale<T>(
    transport: &T,
    org: &str,
    team: &str,
    opts: &ListOpts,
) -> Result<Vec<Backport>, BackportError>
where
    T: SearchTransport + Sync + ?Sized,
{
    stale_backports_as_of(transport, org, team, opts, today()).await
}

/// [`list_grouped_backports`] with date defaults resolved against `today`.
pub async fn grouped_backports_as_of<T>(
    transport: &T,
    org: &str,
    team: &str,
    opts: &ListOpts,
    today: NaiveDate,
) -> Result<BackportGroup, BackportError>
where
    T: SearchTransport + Sync + ?Sized,
{
    let mut grouped = BackportGroup::new();

    for partition in BackportState::partitions() {
        let query = grouped_query(org, team, opts, today, partition);
        let group: BackportGroup = search_backports(transport, &query, partition)
            .await?
            .into_iter()
            .collect();

        debug!(
            %partition,
            titles = group.len(),
            backports = group.backport_count(),
            "collected partition"
        );
        grouped.merge(group);
    }

    Ok(grouped)
}

/// [`list_stale`] with the age cutoff resolved against `today`.
pub async fn stale_backports_as_of<T>(
    transport: &T,
    org: &str,
    team: &str,
    opts: &ListOpts,
    today: NaiveDate,
) -> Result<Vec<Backport>, BackportError>
where
    T: SearchTransport + Sync + ?Sized,
{
    let query = stale_query(org, team, opts, today);
    search_backports(transport, &query, BackportState::Open).await
}

async fn search_backports<T>(
    transport: &T,
    query: &SearchQuery,
    partition: BackportState,
) -> Result<Vec<Backport>, BackportError>
where
    T: SearchTransport + Sync + ?Sized,
{
    fetch_all(transport, query)
        .await?
        .iter()
        .map(|issue| parse_backport(issue, partition))
        .collect()
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
