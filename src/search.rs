use async_trait::async_trait;
use tracing::debug;

use crate::{
    error::{BackportError, TransportError},
    types::{IssueRecord, SearchPage, SearchQuery},
};

/// Results requested per search page.
pub const PAGE_SIZE: u8 = 100;

/// A paginated issue search backend.
///
/// Implementations issue exactly one request per call and report the
/// next page to ask for, if any. Retries and rate limiting belong here
/// rather than in the callers.
#[async_trait]
pub trait SearchTransport {
    async fn search(
        &self,
        query: &SearchQuery,
        page: u32,
        per_page: u8,
    ) -> Result<SearchPage, TransportError>;
}

/// Runs `query` until the transport reports no further page and returns
/// every issue in the order received.
///
/// The first failing page aborts the whole query; nothing fetched before
/// it is returned.
pub async fn fetch_all<T>(
    transport: &T,
    query: &SearchQuery,
) -> Result<Vec<IssueRecord>, BackportError>
where
    T: SearchTransport + Sync + ?Sized,
{
    let mut issues = Vec::new();
    let mut page = 1;

    loop {
        debug!(query = %query.text, page, "fetching search page");
        let result = transport
            .search(query, page, PAGE_SIZE)
            .await
            .map_err(BackportError::Transport)?;

        debug!(page, count = result.issues.len(), "received search page");
        issues.extend(result.issues);

        match result.next_page {
            Some(next) => page = next,
            None => break,
        }
    }

    Ok(issues)
}
