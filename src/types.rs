use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;
use url::Url;

/// Days of history the grouped listing covers when no `since` is given.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 15;

/// Age in days after which an open backport counts as stale by default.
pub const DEFAULT_STALE_DAYS: u32 = 30;

/// Resolved state of a backport pull request.
///
/// The issue search API only distinguishes open from closed, so `Merged`
/// and `Closed` are recovered from which search partition returned the
/// pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackportState {
    Open,
    Merged,
    Closed,
}

impl BackportState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackportState::Open => "open",
            BackportState::Merged => "merged",
            BackportState::Closed => "closed",
        }
    }

    /// Search qualifiers selecting exactly the pull requests in this state.
    pub fn qualifiers(&self) -> &'static str {
        match self {
            BackportState::Open => "is:open",
            BackportState::Merged => "is:merged",
            BackportState::Closed => "is:closed is:unmerged",
        }
    }

    /// The partitions a grouped listing runs, in merge order.
    pub fn partitions() -> [BackportState; 3] {
        [
            BackportState::Open,
            BackportState::Merged,
            BackportState::Closed,
        ]
    }
}

impl std::fmt::Display for BackportState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw issue state as reported by the search index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueState {
    Open,
    Closed,
}

/// One search hit as handed over by a transport.
#[derive(Debug, Clone)]
pub struct IssueRecord {
    pub number: u64,
    pub title: String,
    pub state: IssueState,
    pub html_url: Url,
    pub repository_url: Url,
    pub created_at: DateTime<Utc>,
}

/// A repository identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repo {
    pub owner: String,
    pub name: String,
}

impl Repo {
    /// Resolves the repository from its API URL
    /// (`https://api.github.com/repos/<owner>/<name>`) by taking the last
    /// two path segments.
    pub fn from_api_url(url: &Url) -> Option<Self> {
        let segments: Vec<&str> = url
            .path_segments()?
            .filter(|segment| !segment.is_empty())
            .collect();

        match segments.as_slice() {
            [.., owner, name] => Some(Repo {
                owner: owner.to_string(),
                name: name.to_string(),
            }),
            _ => None,
        }
    }

    /// Web permalink of pull request `reference` in this repository.
    ///
    /// A leading `#` on the reference is dropped so `#1234` and `1234`
    /// link to the same pull request.
    pub fn pull_url(&self, reference: &str) -> String {
        let number = reference.strip_prefix('#').unwrap_or(reference);
        format!("https://github.com/{}/{}/pull/{}", self.owner, self.name, number)
    }
}

impl std::fmt::Display for Repo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A parsed backport pull request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Backport {
    pub version: String,
    pub version_title: String,
    pub title: String,
    pub state: BackportState,
    pub url: String,
    pub issue_number: u64,
    pub parent_version: String,
    pub parent_url: String,
    pub created_at: DateTime<Utc>,
}

/// Backports keyed by their canonical feature title.
///
/// Each entry keeps backports in the order they were added; merging only
/// ever appends.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BackportGroup(BTreeMap<String, Vec<Backport>>);

impl BackportGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, backport: Backport) {
        self.0
            .entry(backport.title.clone())
            .or_default()
            .push(backport);
    }

    /// Appends every list of `other` onto the list under the same title,
    /// creating titles not seen yet.
    pub fn merge(&mut self, other: BackportGroup) {
        for (title, backports) in other.0 {
            self.0.entry(title).or_default().extend(backports);
        }
    }

    pub fn get(&self, title: &str) -> Option<&[Backport]> {
        self.0.get(title).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Backport])> {
        self.0
            .iter()
            .map(|(title, backports)| (title.as_str(), backports.as_slice()))
    }

    /// Number of distinct feature titles.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of backports across all titles.
    pub fn backport_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

impl FromIterator<Backport> for BackportGroup {
    fn from_iter<I: IntoIterator<Item = Backport>>(iter: I) -> Self {
        let mut group = BackportGroup::new();
        for backport in iter {
            group.push(backport);
        }
        group
    }
}

/// Options for the listing operations.
///
/// Unset fields fall back to [`DEFAULT_LOOKBACK_DAYS`] before today and
/// [`DEFAULT_STALE_DAYS`] respectively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOpts {
    /// Lower bound on the creation date for grouped listings.
    pub since: Option<NaiveDate>,
    /// Minimum age in days for stale listings.
    pub older_than: Option<u32>,
}

impl ListOpts {
    pub fn since(mut self, date: NaiveDate) -> Self {
        self.since = Some(date);
        self
    }

    pub fn older_than(mut self, days: u32) -> Self {
        self.older_than = Some(days);
        self
    }

    pub fn since_or_default(&self, today: NaiveDate) -> NaiveDate {
        self.since
            .unwrap_or_else(|| days_before(today, DEFAULT_LOOKBACK_DAYS))
    }

    /// Latest creation date an open backport may have to count as stale.
    pub fn created_before(&self, today: NaiveDate) -> NaiveDate {
        days_before(today, self.older_than.unwrap_or(DEFAULT_STALE_DAYS))
    }
}

// Clamps to the earliest representable date instead of overflowing.
fn days_before(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}

/// Result ordering requested from the search index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

/// A rendered search query plus the creation-date ordering it wants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub order: SortOrder,
}

/// One page of search results.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub issues: Vec<IssueRecord>,
    /// Page to request next, `None` once the results are exhausted.
    pub next_page: Option<u32>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn backport(title: &str, version: &str, state: BackportState) -> Backport {
        Backport {
            version: version.to_string(),
            version_title: format!("Backport #1 to {version}: {title}"),
            title: title.to_string(),
            state,
            url: "https://github.com/acme/widgets/pull/2".to_string(),
            issue_number: 2,
            parent_version: "#1".to_string(),
            parent_url: "https://github.com/acme/widgets/pull/1".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_repo_from_api_url() {
        let url = Url::parse("https://api.github.com/repos/acme/widgets").unwrap();
        let repo = Repo::from_api_url(&url).unwrap();
        assert_eq!(repo.owner, "acme");
        assert_eq!(repo.name, "widgets");
        assert_eq!(repo.to_string(), "acme/widgets");
    }

    #[test]
    fn test_repo_from_api_url_trailing_slash() {
        let url = Url::parse("https://api.github.com/repos/acme/widgets/").unwrap();
        assert_eq!(
            Repo::from_api_url(&url),
            Some(Repo {
                owner: "acme".to_string(),
                name: "widgets".to_string()
            })
        );
    }

    #[test]
    fn test_repo_from_api_url_too_short() {
        let url = Url::parse("https://api.github.com/widgets").unwrap();
        assert_eq!(Repo::from_api_url(&url), None);
    }

    #[test]
    fn test_pull_url_strips_hash() {
        let repo = Repo {
            owner: "acme".to_string(),
            name: "widgets".to_string(),
        };
        assert_eq!(
            repo.pull_url("#1234"),
            "https://github.com/acme/widgets/pull/1234"
        );
        assert_eq!(
            repo.pull_url("1234"),
            "https://github.com/acme/widgets/pull/1234"
        );
    }

    #[test]
    fn test_group_push_keeps_insertion_order() {
        let group: BackportGroup = vec![
            backport("Fix crash", "v1.2", BackportState::Open),
            backport("Other", "v1.2", BackportState::Open),
            backport("Fix crash", "v1.1", BackportState::Merged),
        ]
        .into_iter()
        .collect();

        assert_eq!(group.len(), 2);
        let versions: Vec<&str> = group
            .get("Fix crash")
            .unwrap()
            .iter()
            .map(|b| b.version.as_str())
            .collect();
        assert_eq!(versions, vec!["v1.2", "v1.1"]);
    }

    #[test]
    fn test_group_merge_appends() {
        let mut acc: BackportGroup = vec![backport("Fix crash", "v1.2", BackportState::Open)]
            .into_iter()
            .collect();
        let other: BackportGroup = vec![
            backport("Fix crash", "v1.1", BackportState::Merged),
            backport("New thing", "v1.1", BackportState::Merged),
        ]
        .into_iter()
        .collect();

        acc.merge(other);

        assert_eq!(acc.len(), 2);
        assert_eq!(acc.backport_count(), 3);
        let states: Vec<BackportState> = acc
            .get("Fix crash")
            .unwrap()
            .iter()
            .map(|b| b.state)
            .collect();
        assert_eq!(states, vec![BackportState::Open, BackportState::Merged]);
    }

    #[test]
    fn test_group_merge_empty_is_noop() {
        let mut acc: BackportGroup = vec![backport("Fix crash", "v1.2", BackportState::Open)]
            .into_iter()
            .collect();
        let before = acc.clone();

        acc.merge(BackportGroup::new());

        assert_eq!(acc, before);
    }

    #[test]
    fn test_list_opts_defaults() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let opts = ListOpts::default();

        assert_eq!(
            opts.since_or_default(today),
            NaiveDate::from_ymd_opt(2024, 3, 16).unwrap()
        );
        assert_eq!(
            opts.created_before(today),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_list_opts_fields_fall_back_independently() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let opts = ListOpts::default().older_than(10);

        assert_eq!(
            opts.created_before(today),
            NaiveDate::from_ymd_opt(2024, 3, 21).unwrap()
        );
        assert_eq!(
            opts.since_or_default(today),
            NaiveDate::from_ymd_opt(2024, 3, 16).unwrap()
        );
    }

    #[test]
    fn test_list_opts_huge_threshold_clamps_to_earliest_date() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();

        assert_eq!(
            ListOpts::default().older_than(200_000_000).created_before(today),
            NaiveDate::MIN
        );
        assert_eq!(
            ListOpts::default().older_than(u32::MAX).created_before(today),
            NaiveDate::MIN
        );
    }

    #[test]
    fn test_state_qualifiers_cover_partitions() {
        let qualifiers: Vec<&str> = BackportState::partitions()
            .iter()
            .map(BackportState::qualifiers)
            .collect();
        assert_eq!(
            qualifiers,
            vec!["is:open", "is:merged", "is:closed is:unmerged"]
        );
    }
}
