use thiserror::Error;

/// Error type a [`SearchTransport`](crate::SearchTransport) reports for a
/// failed page request.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a title did not follow the backport naming convention.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("no ':' separates the version prefix from the description")]
    MissingSeparator,
    #[error("expected at least four words ('<word> <parent> <word> <version>:'), found {0}")]
    TooFewTokens(usize),
    #[error("nothing follows the ':' separator")]
    EmptyDescription,
    #[error("repository URL '{0}' does not name an owner/repo pair")]
    UnknownRepository(String),
}

/// Errors surfaced by the listing operations.
///
/// Both kinds abort the whole request: a caller never sees a partially
/// populated result.
#[derive(Debug, Error)]
pub enum BackportError {
    #[error("search request failed: {0}")]
    Transport(TransportError),

    #[error("error parsing backport '{title}'")]
    Parse {
        title: String,
        #[source]
        reason: ParseFailure,
    },
}

impl BackportError {
    pub fn parse(title: impl Into<String>, reason: ParseFailure) -> Self {
        Self::Parse {
            title: title.into(),
            reason,
        }
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}
