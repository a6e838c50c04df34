use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::types::ListOpts;

const BUILD_INFO_HUMAN: &str = env!("BUILD_INFO_HUMAN");

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Which listing to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Grouped,
    Stale,
}

/// A fully validated invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub command: Command,
    pub org: String,
    pub team: String,
    pub opts: ListOpts,
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
struct ScopeArgs {
    /// GitHub organisation to search
    #[arg(short = 'o', long, env = "BACKPORTS_ORG", value_name = "ORG")]
    pub org: String,

    /// Team (within the organisation) whose pull requests are listed
    #[arg(short = 't', long, env = "BACKPORTS_TEAM", value_name = "TEAM")]
    pub team: String,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug, Clone)]
enum CliCommand {
    /// Group backports by the feature they port, across open, merged and closed states
    Grouped {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Only backports created on or after this date (YYYY-MM-DD; default 15 days ago)
        #[arg(short = 's', long, value_name = "DATE")]
        since: Option<String>,
    },

    /// List open backports older than a number of days
    Stale {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Minimum age in days (default 30)
        #[arg(short = 'd', long = "older-than", value_name = "DAYS")]
        older_than: Option<u32>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "backports")]
#[command(about = "Audit which fixes have been backported to maintenance branches")]
#[command(long_version = BUILD_INFO_HUMAN)]
struct CliArgs {
    #[command(subcommand)]
    pub command: CliCommand,
}

fn parse_since(since: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(since.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid --since date '{}', expected YYYY-MM-DD", since))
}

fn validate_scope(scope: &ScopeArgs) -> Result<()> {
    for (flag, value) in [("--org", &scope.org), ("--team", &scope.team)] {
        if value.trim().is_empty() {
            anyhow::bail!("{} must not be empty", flag);
        }
        if value.chars().any(char::is_whitespace) {
            anyhow::bail!("{} must not contain whitespace, got: '{}'", flag, value);
        }
    }
    Ok(())
}

fn create_request(cli: CliArgs) -> Result<Request> {
    let (command, scope, opts) = match cli.command {
        CliCommand::Grouped { scope, since } => {
            let since = since.as_deref().map(parse_since).transpose()?;
            (
                Command::Grouped,
                scope,
                ListOpts {
                    since,
                    older_than: None,
                },
            )
        }
        CliCommand::Stale { scope, older_than } => (
            Command::Stale,
            scope,
            ListOpts {
                since: None,
                older_than,
            },
        ),
    };

    validate_scope(&scope)?;

    Ok(Request {
        command,
        org: scope.org,
        team: scope.team,
        opts,
        format: scope.format,
    })
}

/// Parses command-line arguments into a validated [`Request`].
pub fn parse_args<I, T>(args: I) -> Result<Request>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = CliArgs::try_parse_from(args)?;
    create_request(cli)
}
