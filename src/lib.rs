//! Backports: audit which fixes have been ported to maintenance branches.
//!
//! Searches a GitHub organisation for pull requests following the
//! `Backport <parent> to <version>: <description>` title convention,
//! parses them, and reports them either grouped by the feature they port
//! (across open, merged and closed states) or as a list of stale open
//! backports.

pub mod aggregate;
pub mod cli;
pub mod error;
pub mod github;
pub mod query;
pub mod search;
pub mod title;
pub mod types;

pub use aggregate::{
    Backports, grouped_backports_as_of, list_grouped_backports, list_stale, stale_backports_as_of,
};
pub use cli::{Command, OutputFormat, Request, parse_args};
pub use error::{BackportError, ParseFailure, TransportError};
pub use github::GitHub;
pub use search::{PAGE_SIZE, SearchTransport, fetch_all};
pub use title::{ParsedTitle, parse_backport, parse_title};
pub use types::{
    Backport, BackportGroup, BackportState, IssueRecord, IssueState, ListOpts, Repo, SearchPage,
    SearchQuery, SortOrder,
};
