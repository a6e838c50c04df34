use chrono::NaiveDate;

use crate::types::{BackportState, ListOpts, SearchQuery, SortOrder};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Accumulates GitHub search qualifiers into a query string.
#[derive(Debug, Default)]
pub struct SearchQueryBuilder {
    terms: Vec<String>,
}

impl SearchQueryBuilder {
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    pub fn org(&mut self, org: &str) -> &mut Self {
        self.terms.push(format!("org:{}", org));
        self
    }

    pub fn team(&mut self, org: &str, team: &str) -> &mut Self {
        self.terms.push(format!("team:{}/{}", org, team));
        self
    }

    pub fn created_since(&mut self, date: NaiveDate) -> &mut Self {
        self.terms
            .push(format!("created:>={}", date.format(DATE_FORMAT)));
        self
    }

    pub fn created_until(&mut self, date: NaiveDate) -> &mut Self {
        self.terms
            .push(format!("created:<={}", date.format(DATE_FORMAT)));
        self
    }

    pub fn state(&mut self, state: BackportState) -> &mut Self {
        self.terms.push(state.qualifiers().to_string());
        self
    }

    pub fn pr_type(&mut self) -> &mut Self {
        self.terms.push("is:pr".to_string());
        self
    }

    pub fn in_title(&mut self, text: &str) -> &mut Self {
        self.terms.push(format!("in:title {}", text));
        self
    }

    pub fn build(&self) -> String {
        self.terms.join(" ")
    }
}

/// Query for one state partition of a grouped listing.
///
/// Partitions share every qualifier except the state ones, which are
/// disjoint, so running all of [`BackportState::partitions`] visits each
/// backport exactly once. Results come oldest first.
pub fn grouped_query(
    org: &str,
    team: &str,
    opts: &ListOpts,
    today: NaiveDate,
    partition: BackportState,
) -> SearchQuery {
    let text = SearchQueryBuilder::new()
        .org(org)
        .team(org, team)
        .created_since(opts.since_or_default(today))
        .pr_type()
        .in_title("Backport")
        .state(partition)
        .build();

    SearchQuery {
        text,
        order: SortOrder::Ascending,
    }
}

/// Query for open backports created on or before the staleness cutoff,
/// newest first.
pub fn stale_query(org: &str, team: &str, opts: &ListOpts, today: NaiveDate) -> SearchQuery {
    let text = SearchQueryBuilder::new()
        .org(org)
        .team(org, team)
        .state(BackportState::Open)
        .created_until(opts.created_before(today))
        .pr_type()
        .in_title("Backport")
        .build();

    SearchQuery {
        text,
        order: SortOrder::Descending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn test_grouped_query_partitions() {
        let opts = ListOpts::default().since(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let queries: Vec<String> = BackportState::partitions()
            .into_iter()
            .map(|state| grouped_query("acme", "core", &opts, today(), state).text)
            .collect();

        let base = "org:acme team:acme/core created:>=2024-06-01 is:pr in:title Backport";
        assert_eq!(
            queries,
            vec![
                format!("{base} is:open"),
                format!("{base} is:merged"),
                format!("{base} is:closed is:unmerged"),
            ]
        );
    }

    #[test]
    fn test_grouped_query_default_since() {
        let query = grouped_query(
            "acme",
            "core",
            &ListOpts::default(),
            today(),
            BackportState::Open,
        );
        assert!(query.text.contains("created:>=2024-06-15"));
        assert_eq!(query.order, SortOrder::Ascending);
    }

    #[test]
    fn test_stale_query() {
        let query = stale_query("acme", "core", &ListOpts::default().older_than(60), today());
        assert_eq!(
            query.text,
            "org:acme team:acme/core is:open created:<=2024-05-01 is:pr in:title Backport"
        );
        assert_eq!(query.order, SortOrder::Descending);
    }

    #[test]
    fn test_stale_query_default_threshold() {
        let query = stale_query("acme", "core", &ListOpts::default(), today());
        assert!(query.text.contains("created:<=2024-05-31"));
    }

    #[test]
    fn test_builder_empty() {
        assert_eq!(SearchQueryBuilder::new().build(), "");
    }
}
