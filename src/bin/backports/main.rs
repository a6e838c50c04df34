mod display;

use anyhow::Context;
use backports::{Backports, Command, GitHub, OutputFormat, parse_args};
use display::{display_grouped, display_json, display_stale};

fn handle_clap_help_version(clap_err: &clap::Error) -> ! {
    use clap::error::ErrorKind;
    match clap_err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{clap_err}");
            std::process::exit(0);
        }
        _ => {
            eprint!("{clap_err}");
            std::process::exit(2);
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let request = match parse_args(std::env::args()) {
        Ok(request) => request,
        Err(err) => {
            if let Some(clap_err) = err.downcast_ref::<clap::Error>() {
                handle_clap_help_version(clap_err);
            } else {
                return Err(err);
            }
        }
    };

    let backports = Backports::new(GitHub::from_env()?);
    let mut stdout = std::io::stdout();

    match request.command {
        Command::Grouped => {
            let grouped = backports
                .list_grouped_backports(&request.org, &request.team, &request.opts)
                .await
                .with_context(|| {
                    format!(
                        "Unable to list backports for team {}/{}",
                        request.org, request.team
                    )
                })?;
            match request.format {
                OutputFormat::Text => display_grouped(&grouped, &mut stdout)?,
                OutputFormat::Json => display_json(&grouped, &mut stdout)?,
            }
        }
        Command::Stale => {
            let stale = backports
                .list_stale(&request.org, &request.team, &request.opts)
                .await
                .with_context(|| {
                    format!(
                        "Unable to list stale backports for team {}/{}",
                        request.org, request.team
                    )
                })?;
            match request.format {
                OutputFormat::Text => display_stale(&stale, &mut stdout)?,
                OutputFormat::Json => display_json(&stale, &mut stdout)?,
            }
        }
    }

    Ok(())
}
